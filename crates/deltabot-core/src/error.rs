//! Error types for deltabot-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("Invalid signal: {0}")]
    InvalidSignal(String),

    #[error("Invalid order side: {0}")]
    InvalidSide(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
