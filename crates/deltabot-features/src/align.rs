//! Merge-by-timestamp alignment of the three instruments.
//!
//! The primary series defines the timeline. Each reference series is walked
//! with its own cursor and contributes the close of its last bar at or
//! before each primary time.

use chrono::{DateTime, Utc};
use deltabot_core::Bar;
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};

/// How to treat primary rows that precede every reference bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Live loop: back-fill leading gaps so the frame keeps every primary row.
    #[default]
    Fill,
    /// Offline datasets: drop rows with no prior reference value.
    DropLeading,
}

/// One row of the aligned frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub time: DateTime<Utc>,
    pub btc_close: f64,
    pub btc_volume: f64,
    pub gold_close: f64,
    pub usd_close: f64,
}

/// Rows on the primary timeline with no missing values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedFrame {
    rows: Vec<AlignedRow>,
}

impl AlignedFrame {
    pub fn from_rows(rows: Vec<AlignedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&AlignedRow> {
        self.rows.last()
    }
}

/// Carry-forward cursor over one ascending reference series.
struct AsOfCursor<'a> {
    bars: &'a [Bar],
    next: usize,
    current: Option<f64>,
}

impl<'a> AsOfCursor<'a> {
    fn new(bars: &'a [Bar]) -> Self {
        Self {
            bars,
            next: 0,
            current: None,
        }
    }

    /// Close of the last bar with `time <= t`. `t` must be non-decreasing
    /// across calls.
    fn advance_to(&mut self, t: DateTime<Utc>) -> Option<f64> {
        while let Some(bar) = self.bars.get(self.next) {
            if bar.time > t {
                break;
            }
            if bar.close.is_finite() {
                self.current = Some(bar.close);
            }
            self.next += 1;
        }
        self.current
    }
}

fn sorted(bars: &[Bar]) -> Vec<Bar> {
    let mut out = bars.to_vec();
    out.sort_by_key(|b| b.time);
    out
}

/// Replace leading `None`s with the first resolved value, or with
/// `fallback` when nothing resolved at all.
fn back_fill(values: &mut [Option<f64>], fallback: f64) {
    let first = values.iter().flatten().next().copied().unwrap_or(fallback);
    for v in values.iter_mut().take_while(|v| v.is_none()) {
        *v = Some(first);
    }
}

/// Align the reference series onto the primary timeline.
pub fn align(
    primary: &[Bar],
    gold: &[Bar],
    usd: &[Bar],
    policy: GapPolicy,
) -> FeatureResult<AlignedFrame> {
    if primary.is_empty() {
        return Err(FeatureError::EmptySeries("primary".to_string()));
    }
    if policy == GapPolicy::Fill {
        if gold.is_empty() {
            return Err(FeatureError::EmptySeries("gold".to_string()));
        }
        if usd.is_empty() {
            return Err(FeatureError::EmptySeries("usd".to_string()));
        }
    }

    let primary = sorted(primary);
    let gold = sorted(gold);
    let usd = sorted(usd);

    let mut gold_cursor = AsOfCursor::new(&gold);
    let mut usd_cursor = AsOfCursor::new(&usd);

    let mut gold_col = Vec::with_capacity(primary.len());
    let mut usd_col = Vec::with_capacity(primary.len());
    for bar in &primary {
        gold_col.push(gold_cursor.advance_to(bar.time));
        usd_col.push(usd_cursor.advance_to(bar.time));
    }

    if policy == GapPolicy::Fill {
        // Only reachable when every reference bar is later than the primary
        // row; fall back to the earliest reference close.
        back_fill(&mut gold_col, gold.first().map_or(0.0, |b| b.close));
        back_fill(&mut usd_col, usd.first().map_or(0.0, |b| b.close));
    }

    let rows = primary
        .iter()
        .zip(gold_col)
        .zip(usd_col)
        .filter_map(|((bar, gold), usd)| {
            Some(AlignedRow {
                time: bar.time,
                btc_close: bar.close,
                btc_volume: if bar.volume.is_finite() { bar.volume } else { 0.0 },
                gold_close: gold?,
                usd_close: usd?,
            })
        })
        .collect();

    Ok(AlignedFrame::from_rows(rows))
}
