//! deltabot signal trader.
//!
//! Orchestrates one decision cycle per interval:
//! - Ticker price
//! - Signal generation (market data, features, model score)
//! - Position state machine and order gateway
//! - Ledger row

pub mod app;
pub mod config;
pub mod error;

pub use app::{Application, CycleReport};
pub use config::{AppConfig, OperatingMode};
pub use error::{AppError, AppResult};
