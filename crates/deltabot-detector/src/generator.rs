//! Signal generator.
//!
//! One attempt runs fetch → align → build → score. Failed attempts are
//! retried a bounded number of times; when all fail, or an error cannot
//! clear within the cycle, the signal is `hold`.

use std::sync::Arc;

use deltabot_core::Signal;
use deltabot_feed::MarketDataAdapter;
use deltabot_features::{align, latest_features, GapPolicy};
use deltabot_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::config::DetectorConfig;
use crate::error::{DetectorError, DetectorResult};
use crate::scorer::Scorer;

/// Outcome of one `generate` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalDecision {
    pub signal: Signal,
    /// Score of the successful attempt, if any.
    pub score: Option<f64>,
    /// Attempts made (0 when no scorer is loaded).
    pub attempts: u32,
}

impl SignalDecision {
    fn hold(attempts: u32) -> Self {
        Self {
            signal: Signal::Hold,
            score: None,
            attempts,
        }
    }
}

fn failure_reason(err: &DetectorError) -> &'static str {
    match err {
        DetectorError::Feed(_) => "data",
        DetectorError::Feature(_) => "features",
        DetectorError::Score(_) | DetectorError::NonFiniteScore(_) => "score",
        _ => "other",
    }
}

/// Turns market data into a buy/sell/hold signal.
pub struct SignalGenerator {
    adapter: Arc<MarketDataAdapter>,
    scorer: Option<Arc<dyn Scorer>>,
    config: DetectorConfig,
}

impl SignalGenerator {
    /// `scorer` is `None` when the model failed to load; every signal is then `hold`.
    pub fn new(
        adapter: Arc<MarketDataAdapter>,
        scorer: Option<Arc<dyn Scorer>>,
        config: DetectorConfig,
    ) -> Self {
        Self {
            adapter,
            scorer,
            config,
        }
    }

    /// One fetch → align → build → score pass.
    async fn score_once(&self, scorer: &dyn Scorer) -> DetectorResult<f64> {
        let series = self
            .adapter
            .fetch_all(self.config.resolution, self.config.window)
            .await?;
        let frame = align(&series.primary, &series.gold, &series.usd, GapPolicy::Fill)?;
        let features = latest_features(&frame)?;

        let score = scorer.score(&features)?;
        if !score.is_finite() {
            return Err(DetectorError::NonFiniteScore(score));
        }
        debug!(rows = frame.len(), time = %features.time, score, "Scored latest bar");
        Ok(score)
    }

    /// Produce this cycle's signal. Never fails; exhausted retries yield `hold`.
    pub async fn generate(&self) -> SignalDecision {
        let Some(scorer) = self.scorer.as_deref() else {
            Metrics::signal_emitted(Signal::Hold.as_str());
            return SignalDecision::hold(0);
        };

        let max_attempts = self.config.max_retries.max(1);
        for attempt in 1..=max_attempts {
            match self.score_once(scorer).await {
                Ok(score) => {
                    let signal = self.config.thresholds.classify(score);
                    Metrics::score_observed(score);
                    Metrics::signal_emitted(signal.as_str());
                    info!(score, %signal, attempt, "Signal generated");
                    return SignalDecision {
                        signal,
                        score: Some(score),
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    Metrics::signal_attempt_failed(failure_reason(&e));
                    warn!(attempt, max_attempts, error = %e, "Signal attempt failed");
                    if !e.is_retryable() {
                        warn!(attempt, "Error is not retryable, holding");
                        Metrics::signal_emitted(Signal::Hold.as_str());
                        return SignalDecision::hold(attempt);
                    }
                    if attempt < max_attempts {
                        tokio::time::sleep(self.config.retry_delay()).await;
                    }
                }
            }
        }

        warn!(max_attempts, "All signal attempts failed, holding");
        Metrics::signal_emitted(Signal::Hold.as_str());
        SignalDecision::hold(max_attempts)
    }
}
