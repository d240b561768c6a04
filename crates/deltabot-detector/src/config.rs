//! Detector configuration.

use std::time::Duration;

use deltabot_core::{Resolution, Signal};
use serde::{Deserialize, Serialize};

/// One-sided score thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Scores strictly above this are a buy.
    #[serde(default = "default_buy_threshold")]
    pub buy: f64,
    /// Scores strictly below this are a sell.
    #[serde(default = "default_sell_threshold")]
    pub sell: f64,
}

fn default_buy_threshold() -> f64 {
    0.00015
}

fn default_sell_threshold() -> f64 {
    -0.00015
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            buy: default_buy_threshold(),
            sell: default_sell_threshold(),
        }
    }
}

impl Thresholds {
    pub fn classify(&self, score: f64) -> Signal {
        Signal::from_score(score, self.buy, self.sell)
    }
}

/// Configuration for signal generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Bar resolution for every instrument.
    #[serde(default)]
    pub resolution: Resolution,
    /// Bars requested per instrument.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Full fetch→score attempts per cycle.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Pause between failed attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_window() -> usize {
    200
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            resolution: Resolution::default(),
            window: default_window(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl DetectorConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.thresholds.sell > self.thresholds.buy {
            return Err(format!(
                "sell threshold ({}) must not exceed buy threshold ({})",
                self.thresholds.sell, self.thresholds.buy
            ));
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        if self.window < deltabot_features::MIN_HISTORY {
            return Err(format!(
                "window ({}) must be at least {} bars",
                self.window,
                deltabot_features::MIN_HISTORY
            ));
        }
        Ok(())
    }
}
