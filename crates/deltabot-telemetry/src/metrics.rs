//! Prometheus metrics for deltabot.
//!
//! Covers the decision loop end to end:
//! - Cycle outcomes and duration
//! - Signal generation (scores, failed attempts)
//! - Order submission and fills
//! - Position and persistence health
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure means duplicate metric
//! names, which should crash at startup. These panics only occur during
//! static initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, register_int_gauge, CounterVec,
    Gauge, Histogram, IntGauge,
};

/// Completed decision cycles.
/// Labels: outcome (ok/error)
pub static CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "deltabot_cycles_total",
        "Total decision cycles by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Wall time of one cycle in milliseconds.
pub static CYCLE_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "deltabot_cycle_duration_ms",
        "Decision cycle duration in milliseconds",
        vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0]
    )
    .unwrap()
});

/// Signals emitted.
/// Labels: signal (buy/sell/hold)
pub static SIGNALS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "deltabot_signals_total",
        "Total signals emitted",
        &["signal"]
    )
    .unwrap()
});

/// Failed fetch→score attempts.
/// Labels: reason (data/features/score)
pub static SIGNAL_ATTEMPT_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "deltabot_signal_attempt_failures_total",
        "Failed signal attempts by reason",
        &["reason"]
    )
    .unwrap()
});

/// Model score distribution.
pub static SCORE: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "deltabot_score",
        "Raw model score",
        vec![-0.001, -0.0005, -0.00015, -0.00005, 0.0, 0.00005, 0.00015, 0.0005, 0.001]
    )
    .unwrap()
});

/// Order submissions.
/// Labels: side, outcome (filled/unconfirmed)
pub static ORDERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "deltabot_orders_total",
        "Total order submissions by outcome",
        &["side", "outcome"]
    )
    .unwrap()
});

/// Order gateway failures.
/// Labels: kind (unauthorized/rejected/network/malformed)
pub static ORDER_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "deltabot_order_errors_total",
        "Order gateway failures by kind",
        &["kind"]
    )
    .unwrap()
});

/// Net position in contracts.
pub static POSITION: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("deltabot_position", "Current net position in contracts").unwrap()
});

/// Last ticker price.
pub static LAST_PRICE: Lazy<Gauge> =
    Lazy::new(|| register_gauge!("deltabot_last_price", "Last ticker price").unwrap());

/// Durable write failures.
/// Labels: target (state/ledger)
pub static PERSISTENCE_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "deltabot_persistence_failures_total",
        "Failed durable writes by target",
        &["target"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a finished cycle.
    pub fn cycle_completed(ok: bool, duration_ms: f64) {
        let outcome = if ok { "ok" } else { "error" };
        CYCLES_TOTAL.with_label_values(&[outcome]).inc();
        CYCLE_DURATION_MS.observe(duration_ms);
    }

    pub fn signal_emitted(signal: &str) {
        SIGNALS_TOTAL.with_label_values(&[signal]).inc();
    }

    pub fn signal_attempt_failed(reason: &str) {
        SIGNAL_ATTEMPT_FAILURES_TOTAL
            .with_label_values(&[reason])
            .inc();
    }

    pub fn score_observed(score: f64) {
        SCORE.observe(score);
    }

    /// Record an order outcome. `filled` is false when no fill was confirmed.
    pub fn order_submitted(side: &str, filled: bool) {
        let outcome = if filled { "filled" } else { "unconfirmed" };
        ORDERS_TOTAL.with_label_values(&[side, outcome]).inc();
    }

    pub fn order_error(kind: &str) {
        ORDER_ERRORS_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn position_set(position: i64) {
        POSITION.set(position);
    }

    pub fn price_set(price: f64) {
        LAST_PRICE.set(price);
    }

    pub fn persistence_failed(target: &str) {
        PERSISTENCE_FAILURES_TOTAL
            .with_label_values(&[target])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_updates_statics() {
        let before = SIGNALS_TOTAL.with_label_values(&["buy"]).get();
        Metrics::signal_emitted("buy");
        assert_eq!(SIGNALS_TOTAL.with_label_values(&["buy"]).get(), before + 1.0);

        Metrics::position_set(3);
        assert_eq!(POSITION.get(), 3);
    }
}
