//! Feature engineering over an aligned frame.
//!
//! Every column is computed over the whole frame, then each field is filled
//! independently: carry the last defined value forward, zero if none.

use crate::align::AlignedFrame;
use crate::error::{FeatureError, FeatureResult};
use crate::rolling::{self, Column};
use crate::vector::{FeatureVector, FEATURE_COUNT};

/// Minimum aligned rows before a vector is trusted.
pub const MIN_HISTORY: usize = 60;

/// Window for per-instrument volatility.
pub const VOLATILITY_WINDOW: usize = 24;

/// Window for cross-asset correlation.
pub const CORRELATION_WINDOW: usize = 6;

const RETURN_LAGS: [usize; 6] = [1, 2, 3, 6, 12, 24];
const ROLLING_WINDOWS: [usize; 4] = [3, 6, 12, 24];

/// Build one feature vector per frame row. The live loop consumes the last.
pub fn build_features(frame: &AlignedFrame) -> FeatureResult<Vec<FeatureVector>> {
    if frame.len() < MIN_HISTORY {
        return Err(FeatureError::InsufficientHistory {
            required: MIN_HISTORY,
            actual: frame.len(),
        });
    }

    let rows = frame.rows();
    let btc: Vec<f64> = rows.iter().map(|r| r.btc_close).collect();
    let gold: Vec<f64> = rows.iter().map(|r| r.gold_close).collect();
    let usd: Vec<f64> = rows.iter().map(|r| r.usd_close).collect();
    let volume: Column = rows.iter().map(|r| Some(r.btc_volume)).collect();

    let btc_return = rolling::pct_change(&btc);
    let gold_return = rolling::pct_change(&gold);
    let usd_return = rolling::pct_change(&usd);

    let btc_momentum = rolling::diff(&btc);
    let gold_momentum = rolling::diff(&gold);
    let usd_momentum = rolling::diff(&usd);

    let btc_volatility = rolling::rolling_std(&btc_return, VOLATILITY_WINDOW);
    let gold_volatility = rolling::rolling_std(&gold_return, VOLATILITY_WINDOW);
    let usd_volatility = rolling::rolling_std(&usd_return, VOLATILITY_WINDOW);

    let [lag_1, lag_2, lag_3, lag_6, lag_12, lag_24] =
        RETURN_LAGS.map(|l| rolling::shift(&btc_return, l));
    let volatility_lag_12 = rolling::shift(&btc_volatility, 12);
    let volatility_lag_24 = rolling::shift(&btc_volatility, 24);

    let [mean_3, mean_6, mean_12, mean_24] =
        ROLLING_WINDOWS.map(|w| rolling::rolling_mean(&btc_return, w));
    let [std_3, std_6, std_12, std_24] =
        ROLLING_WINDOWS.map(|w| rolling::rolling_std(&btc_return, w));

    let btc_gold_corr = rolling::rolling_corr(&btc_return, &gold_return, CORRELATION_WINDOW);
    let btc_usd_corr = rolling::rolling_corr(&btc_return, &usd_return, CORRELATION_WINDOW);

    let btc_col: Column = btc.iter().map(|v| Some(*v)).collect();
    let gold_col: Column = gold.iter().map(|v| Some(*v)).collect();
    let spread = rolling::zip_with(&btc_col, &gold_col, |b, g| Some(b - g));
    let momentum_diff = rolling::zip_with(&btc_momentum, &gold_momentum, |b, g| Some(b - g));

    let volatility_sqrt = rolling::map(&btc_volatility, |v| Some(v.max(0.0).sqrt()));
    let momentum_sq = rolling::map(&btc_momentum, |m| Some(m * m));
    let log_volume = rolling::map(&volume, |v| (v > 0.0).then(|| v.ln()));
    let vol_mom_ratio = rolling::zip_with(&btc_volatility, &btc_momentum, |v, m| {
        (m != 0.0).then(|| v / m.abs())
    });

    // Layout order; must match FEATURE_NAMES.
    let columns: [&Column; FEATURE_COUNT] = [
        &btc_return,
        &gold_return,
        &usd_return,
        &btc_momentum,
        &btc_volatility,
        &gold_momentum,
        &gold_volatility,
        &usd_momentum,
        &usd_volatility,
        &lag_1,
        &lag_2,
        &lag_3,
        &lag_6,
        &lag_12,
        &volatility_lag_12,
        &lag_24,
        &volatility_lag_24,
        &mean_3,
        &std_3,
        &mean_6,
        &std_6,
        &mean_12,
        &std_12,
        &mean_24,
        &std_24,
        &btc_gold_corr,
        &btc_usd_corr,
        &spread,
        &momentum_diff,
        &volatility_sqrt,
        &momentum_sq,
        &log_volume,
        &vol_mom_ratio,
    ];

    let filled: Vec<Vec<f64>> = columns
        .iter()
        .map(|c| rolling::carry_forward_then_zero(c))
        .collect();

    Ok(rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut values = [0.0; FEATURE_COUNT];
            for (slot, col) in values.iter_mut().zip(&filled) {
                *slot = col[i];
            }
            FeatureVector::new(row.time, values)
        })
        .collect())
}

/// Build features and return only the most recent vector.
pub fn latest_features(frame: &AlignedFrame) -> FeatureResult<FeatureVector> {
    build_features(frame)?
        .pop()
        .ok_or(FeatureError::InsufficientHistory {
            required: MIN_HISTORY,
            actual: 0,
        })
}
