//! Core domain types for the deltabot signal trader.
//!
//! This crate provides fundamental types used throughout the trading system:
//! - `Bar`, `Resolution`: Time-stamped market observations
//! - `Signal`: Discrete trading action derived from a model score
//! - `OrderSide`, `ProductId`, `OrderResult`: Order-related types
//! - `Clock`: Injectable wall clock for signing and synthetic series

pub mod bar;
pub mod clock;
pub mod error;
pub mod order;
pub mod signal;

pub use bar::{Bar, Resolution};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, Result};
pub use order::{OrderResult, OrderSide, ProductId};
pub use signal::Signal;
