//! Prometheus metrics and structured logging for deltabot.
//!
//! - Prometheus counters for cycles, signals, orders and persistence
//! - Structured logging with tracing (JSON in production)
//! - Session summary at shutdown

pub mod error;
pub mod logging;
pub mod metrics;
pub mod summary;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
pub use summary::{SessionReporter, SessionSummary};
