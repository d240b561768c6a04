//! Detector error types.

use deltabot_feed::FeedError;
use deltabot_features::FeatureError;
use thiserror::Error;

/// Failure raised by a scoring function.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Scoring failed: {0}")]
pub struct ScoreError(pub String);

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Feature layout mismatch at {index}: expected {expected}, found {found}")]
    LayoutMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error("Non-finite score: {0}")]
    NonFiniteScore(f64),
}

impl DetectorError {
    /// Whether another attempt in the same cycle may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DetectorError::Feed(e) => e.is_retryable(),
            DetectorError::Feature(_) | DetectorError::Score(_) | DetectorError::NonFiniteScore(_) => {
                true
            }
            DetectorError::ModelLoad(_) | DetectorError::LayoutMismatch { .. } => false,
        }
    }
}

pub type DetectorResult<T> = Result<T, DetectorError>;
