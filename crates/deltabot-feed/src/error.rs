//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// Upstream returned no usable bars. Retriable.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeedError {
    /// Whether a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeedError::DataUnavailable(_) | FeedError::HttpClient(_) | FeedError::InvalidTicker(_)
        )
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
