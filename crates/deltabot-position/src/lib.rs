//! Position management for deltabot.
//!
//! - [`decide`]: decision table keyed by `(Signal, PositionSign)`
//! - [`PositionStore`]: durable JSON position state (temp file + rename)
//! - [`PositionStateMachine`]: applies confirmed fills and persists them

pub mod error;
pub mod machine;
pub mod store;
pub mod table;

pub use error::{PositionError, PositionResult};
pub use machine::{PositionStateMachine, Transition, HOLD_STATUS, OBSERVED_STATUS};
pub use store::{PositionState, PositionStore, UPDATED_AT_FORMAT};
pub use table::{decide, PositionSign};
