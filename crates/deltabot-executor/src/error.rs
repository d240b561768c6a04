//! Executor error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// HTTP 401. Credentials will not become valid mid-run, so never retried.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Order rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExecutorError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutorError::Unauthorized(_) => "unauthorized",
            ExecutorError::Rejected { .. } => "rejected",
            ExecutorError::Network(_) => "network",
            ExecutorError::MalformedResponse(_) | ExecutorError::Serialization(_) => "malformed",
            ExecutorError::Credentials(_) => "credentials",
        }
    }
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
