//! Signal generation for deltabot.
//!
//! Scores the latest feature vector with the loaded model and maps the
//! score onto buy/sell/hold with fixed one-sided thresholds. Any failure
//! along the way degrades to `hold`.

pub mod config;
pub mod error;
pub mod generator;
pub mod scorer;

pub use config::{DetectorConfig, Thresholds};
pub use error::{DetectorError, DetectorResult, ScoreError};
pub use generator::{SignalDecision, SignalGenerator};
pub use scorer::{LinearModelFile, LinearScorer, Scorer};
