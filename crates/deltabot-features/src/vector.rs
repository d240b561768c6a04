//! Fixed-layout feature vector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of features the scorer consumes.
pub const FEATURE_COUNT: usize = 33;

/// Field names in scorer input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "btc_return",
    "gold_return",
    "usd_return",
    "btc_momentum",
    "btc_volatility",
    "gold_momentum",
    "gold_volatility",
    "usd_momentum",
    "usd_volatility",
    "btc_return_lag_1",
    "btc_return_lag_2",
    "btc_return_lag_3",
    "btc_return_lag_6",
    "btc_return_lag_12",
    "btc_volatility_lag_12",
    "btc_return_lag_24",
    "btc_volatility_lag_24",
    "btc_return_rolling_mean_3",
    "btc_return_rolling_std_3",
    "btc_return_rolling_mean_6",
    "btc_return_rolling_std_6",
    "btc_return_rolling_mean_12",
    "btc_return_rolling_std_12",
    "btc_return_rolling_mean_24",
    "btc_return_rolling_std_24",
    "btc_gold_corr_6h",
    "btc_usd_corr_6h",
    "btc_gold_spread",
    "btc_gold_momentum_diff",
    "btc_volatility_sqrt",
    "btc_momentum_sq",
    "log_btc_volume",
    "vol_mom_ratio",
];

/// Position of a named feature in the layout.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == name)
}

/// One fully defined feature vector for the bar at `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub time: DateTime<Utc>,
    #[serde(with = "values_serde")]
    values: [f64; FEATURE_COUNT],
}

/// serde only implements its traits for arrays of up to 32 elements.
mod values_serde {
    use super::FEATURE_COUNT;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        values: &[f64; FEATURE_COUNT],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[f64; FEATURE_COUNT], D::Error> {
        let v = Vec::<f64>::deserialize(deserializer)?;
        let len = v.len();
        v.try_into()
            .map_err(|_| D::Error::invalid_length(len, &"33 feature values"))
    }
}

impl FeatureVector {
    pub fn new(time: DateTime<Utc>, values: [f64; FEATURE_COUNT]) -> Self {
        Self { time, values }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.values[i])
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// `(name, value)` pairs in layout order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}
