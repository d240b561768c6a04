//! Scoring function boundary.
//!
//! The predictive model is loaded once and exposed through `Scorer`.
//! `LinearScorer` is the shipped file format; any closure with the right
//! signature also works, which is how tests inject fixed scores.

use std::path::Path;

use deltabot_features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DetectorError, DetectorResult, ScoreError};

/// Maps a feature vector to a scalar score.
#[cfg_attr(test, mockall::automock)]
pub trait Scorer: Send + Sync {
    fn score(&self, features: &FeatureVector) -> Result<f64, ScoreError>;
}

impl<F> Scorer for F
where
    F: Fn(&FeatureVector) -> Result<f64, ScoreError> + Send + Sync,
{
    fn score(&self, features: &FeatureVector) -> Result<f64, ScoreError> {
        self(features)
    }
}

/// On-disk model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelFile {
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// Per-feature standardization, applied as `(x - mean) / scale`.
    #[serde(default)]
    pub mean: Option<Vec<f64>>,
    #[serde(default)]
    pub scale: Option<Vec<f64>>,
}

/// Standardized linear model: `intercept + Σ w_i * (x_i - mean_i) / scale_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScorer {
    weights: [f64; FEATURE_COUNT],
    intercept: f64,
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

fn to_array(name: &str, values: Vec<f64>) -> DetectorResult<[f64; FEATURE_COUNT]> {
    let len = values.len();
    let arr: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
        DetectorError::ModelLoad(format!("{name} has {len} entries, expected {FEATURE_COUNT}"))
    })?;
    if let Some(i) = arr.iter().position(|v| !v.is_finite()) {
        return Err(DetectorError::ModelLoad(format!("{name}[{i}] is not finite")));
    }
    Ok(arr)
}

impl LinearScorer {
    pub fn new(weights: [f64; FEATURE_COUNT], intercept: f64) -> Self {
        Self {
            weights,
            intercept,
            mean: [0.0; FEATURE_COUNT],
            scale: [1.0; FEATURE_COUNT],
        }
    }

    /// Validate a model file against the feature layout.
    pub fn from_model(model: LinearModelFile) -> DetectorResult<Self> {
        if model.feature_names.len() != FEATURE_COUNT {
            return Err(DetectorError::ModelLoad(format!(
                "model has {} features, expected {FEATURE_COUNT}",
                model.feature_names.len()
            )));
        }
        for (index, (found, expected)) in model.feature_names.iter().zip(FEATURE_NAMES).enumerate() {
            if found != expected {
                return Err(DetectorError::LayoutMismatch {
                    index,
                    expected: expected.to_string(),
                    found: found.clone(),
                });
            }
        }
        if !model.intercept.is_finite() {
            return Err(DetectorError::ModelLoad("intercept is not finite".to_string()));
        }

        let mut scorer = Self::new(to_array("weights", model.weights)?, model.intercept);
        if let Some(mean) = model.mean {
            scorer.mean = to_array("mean", mean)?;
        }
        if let Some(scale) = model.scale {
            // Constant features were fitted with scale 0; leave them unscaled
            scorer.scale = to_array("scale", scale)?.map(|s| if s == 0.0 { 1.0 } else { s });
        }
        Ok(scorer)
    }

    /// Load a JSON model file.
    pub fn from_file(path: impl AsRef<Path>) -> DetectorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DetectorError::ModelLoad(format!("Failed to read {}: {e}", path.display()))
        })?;
        let model: LinearModelFile = serde_json::from_str(&content).map_err(|e| {
            DetectorError::ModelLoad(format!("Failed to parse {}: {e}", path.display()))
        })?;
        let scorer = Self::from_model(model)?;
        info!(path = %path.display(), intercept = scorer.intercept, "Model loaded");
        Ok(scorer)
    }
}

impl Scorer for LinearScorer {
    fn score(&self, features: &FeatureVector) -> Result<f64, ScoreError> {
        let score = features
            .values()
            .iter()
            .enumerate()
            .map(|(i, x)| self.weights[i] * (x - self.mean[i]) / self.scale[i])
            .sum::<f64>()
            + self.intercept;

        if score.is_finite() {
            Ok(score)
        } else {
            Err(ScoreError(format!("score is {score}")))
        }
    }
}
