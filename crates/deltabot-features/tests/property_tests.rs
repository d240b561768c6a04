//! Property tests for the feature pipeline.
//!
//! 1. Live alignment keeps every primary row and leaves no gaps
//! 2. Every field of every vector is finite, whatever the input
//! 3. Feature construction is deterministic

use chrono::{TimeZone, Utc};
use deltabot_core::Bar;
use deltabot_features::{align, build_features, GapPolicy, FEATURE_COUNT, MIN_HISTORY};
use proptest::prelude::*;

// ── Strategies ───────────────────────────────────────────────────────

fn arb_close() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => 1.0..100_000.0_f64,
        1 => Just(0.0),
    ]
}

fn arb_volume() -> impl Strategy<Value = f64> {
    prop_oneof![
        3 => 0.0..1_000.0_f64,
        1 => Just(0.0),
    ]
}

/// Ascending bars with random gaps between 1 and 5 minutes.
fn arb_series(min: usize, max: usize) -> impl Strategy<Value = Vec<Bar>> {
    (
        0i64..600,
        prop::collection::vec((1i64..=5, arb_close(), arb_volume()), min..max),
    )
        .prop_map(|(offset, steps)| {
            let mut t = 1_700_000_000 + offset * 60;
            steps
                .into_iter()
                .map(|(gap, close, volume)| {
                    t += gap * 60;
                    Bar::new(Utc.timestamp_opt(t, 0).unwrap(), close, volume)
                })
                .collect()
        })
}

// ── 1. Alignment ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn fill_alignment_keeps_primary_rows(
        primary in arb_series(1, 120),
        gold in arb_series(1, 120),
        usd in arb_series(1, 120),
    ) {
        let frame = align(&primary, &gold, &usd, GapPolicy::Fill).unwrap();
        prop_assert_eq!(frame.len(), primary.len());
        for row in frame.rows() {
            prop_assert!(row.gold_close.is_finite());
            prop_assert!(row.usd_close.is_finite());
        }
    }

    #[test]
    fn drop_leading_is_a_suffix_of_fill(
        primary in arb_series(1, 120),
        gold in arb_series(1, 120),
        usd in arb_series(1, 120),
    ) {
        let filled = align(&primary, &gold, &usd, GapPolicy::Fill).unwrap();
        let dropped = align(&primary, &gold, &usd, GapPolicy::DropLeading).unwrap();
        prop_assert!(dropped.len() <= filled.len());
        let offset = filled.len() - dropped.len();
        prop_assert_eq!(&filled.rows()[offset..], dropped.rows());
    }
}

// ── 2 & 3. Features ──────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn features_are_finite_and_deterministic(
        primary in arb_series(MIN_HISTORY, 220),
        gold in arb_series(1, 220),
        usd in arb_series(1, 220),
    ) {
        let frame = align(&primary, &gold, &usd, GapPolicy::Fill).unwrap();
        let vectors = build_features(&frame).unwrap();

        prop_assert_eq!(vectors.len(), frame.len());
        for v in &vectors {
            prop_assert_eq!(v.values().len(), FEATURE_COUNT);
            prop_assert!(v.is_finite());
        }
        prop_assert_eq!(vectors, build_features(&frame).unwrap());
    }
}
