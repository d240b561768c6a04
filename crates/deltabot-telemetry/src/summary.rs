//! Session summary logged at shutdown.
//!
//! Reads the process-wide counters, so the numbers cover everything since
//! startup.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::metrics::{
    CYCLES_TOTAL, ORDERS_TOTAL, ORDER_ERRORS_TOTAL, PERSISTENCE_FAILURES_TOTAL, POSITION,
    SIGNALS_TOTAL,
};

/// Totals for one run of the bot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub started_at: DateTime<Utc>,
    pub cycles_ok: u64,
    pub cycles_failed: u64,
    pub buy_signals: u64,
    pub sell_signals: u64,
    pub hold_signals: u64,
    pub orders_filled: u64,
    pub orders_unconfirmed: u64,
    pub order_errors: u64,
    pub persistence_failures: u64,
    pub position: i64,
}

fn count(value: f64) -> u64 {
    value.max(0.0) as u64
}

/// Collects and logs the session summary.
pub struct SessionReporter {
    started_at: DateTime<Utc>,
}

impl Default for SessionReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionReporter {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Snapshot the counters.
    pub fn collect(&self) -> SessionSummary {
        let orders = |outcome: &str| {
            ["buy", "sell"]
                .iter()
                .map(|side| count(ORDERS_TOTAL.with_label_values(&[*side, outcome]).get()))
                .sum::<u64>()
        };
        let sum_labels = |vec: &prometheus::CounterVec, labels: &[&str]| {
            labels
                .iter()
                .map(|l| count(vec.with_label_values(&[*l]).get()))
                .sum::<u64>()
        };

        SessionSummary {
            started_at: self.started_at,
            cycles_ok: count(CYCLES_TOTAL.with_label_values(&["ok"]).get()),
            cycles_failed: count(CYCLES_TOTAL.with_label_values(&["error"]).get()),
            buy_signals: count(SIGNALS_TOTAL.with_label_values(&["buy"]).get()),
            sell_signals: count(SIGNALS_TOTAL.with_label_values(&["sell"]).get()),
            hold_signals: count(SIGNALS_TOTAL.with_label_values(&["hold"]).get()),
            orders_filled: orders("filled"),
            orders_unconfirmed: orders("unconfirmed"),
            order_errors: sum_labels(
                &ORDER_ERRORS_TOTAL,
                &["unauthorized", "rejected", "network", "malformed"],
            ),
            persistence_failures: sum_labels(&PERSISTENCE_FAILURES_TOTAL, &["state", "ledger"]),
            position: POSITION.get(),
        }
    }

    /// Log the summary at info level and return it.
    pub fn log_summary(&self) -> SessionSummary {
        let s = self.collect();
        let uptime_secs = (Utc::now() - s.started_at).num_seconds();
        info!(
            uptime_secs,
            cycles_ok = s.cycles_ok,
            cycles_failed = s.cycles_failed,
            buy_signals = s.buy_signals,
            sell_signals = s.sell_signals,
            hold_signals = s.hold_signals,
            orders_filled = s.orders_filled,
            orders_unconfirmed = s.orders_unconfirmed,
            order_errors = s.order_errors,
            persistence_failures = s.persistence_failures,
            position = s.position,
            "Session summary"
        );
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;

    #[test]
    fn test_collect_reflects_counters() {
        let reporter = SessionReporter::new();
        let before = reporter.collect();

        Metrics::cycle_completed(false, 5.0);
        Metrics::order_submitted("buy", true);
        Metrics::order_error("unauthorized");

        let after = reporter.collect();
        assert!(after.cycles_failed > before.cycles_failed);
        assert!(after.orders_filled > before.orders_filled);
        assert!(after.order_errors > before.order_errors);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = SessionReporter::new().collect();
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("cycles_ok").is_some());
        assert!(json.get("position").is_some());
    }
}
