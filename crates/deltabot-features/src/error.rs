//! Feature pipeline error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeatureError {
    /// Fewer aligned rows than the rolling windows need. Retriable.
    #[error("Insufficient history: need {required} rows, have {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("Empty series: {0}")]
    EmptySeries(String),
}

pub type FeatureResult<T> = Result<T, FeatureError>;
