//! Durable position state.
//!
//! One small JSON file, `{"current_position": 1, "updated_at": "..."}`.
//! Writes go to a sibling temp file which is then renamed over the target,
//! so a crash leaves either the old or the new value.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PositionError, PositionResult};

/// Format of `updated_at`.
pub const UPDATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Persisted position record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionState {
    #[serde(default, deserialize_with = "deserialize_position")]
    pub current_position: i64,
    #[serde(default)]
    pub updated_at: String,
}

impl PositionState {
    /// Stamp `position` with the current local time.
    pub fn now(position: i64) -> Self {
        Self {
            current_position: position,
            updated_at: Local::now().format(UPDATED_AT_FORMAT).to_string(),
        }
    }
}

/// Accepts `1`, `1.0`, `"1"` and `"1.0"`. Fractional or non-numeric values
/// are rejected so the file is treated as corrupt.
fn deserialize_position<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    position_from_value(&value)
        .ok_or_else(|| D::Error::custom(format!("current_position is not an integer: {value}")))
}

fn position_from_value(value: &Value) -> Option<i64> {
    let integral = |f: f64| (f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15).then_some(f as i64);
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

/// File-backed position store.
#[derive(Debug, Clone)]
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored position.
    ///
    /// A missing file is a flat position. An unreadable or corrupt file is
    /// also treated as flat, with a warning.
    pub fn load(&self) -> i64 {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No position state file, starting flat");
            return 0;
        }
        match self.try_load() {
            Ok(state) => state.current_position,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not load position state, starting flat");
                0
            }
        }
    }

    fn try_load(&self) -> PositionResult<PositionState> {
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write `position` atomically.
    pub fn save(&self, position: i64) -> PositionResult<()> {
        let state = PositionState::now(position);
        let json = serde_json::to_string(&state)?;

        let tmp = self.tmp_path();
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            PositionError::Persistence(format!("{}: {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), position, "Position state saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
