//! CSV ledger writer.
//!
//! Opened in append mode. The header is written only when the file is new
//! or empty, so restarts keep extending the same ledger.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use deltabot_core::{OrderSide, ProductId, Signal};
use tracing::{debug, info};

use crate::error::PersistenceResult;

pub const LEDGER_HEADER: [&str; 7] = [
    "Timestamp",
    "Price",
    "Signal",
    "OrderStatus",
    "Side",
    "ProductID",
    "PositionAfter",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Price column text. Whole prices keep one decimal (`64000.0`) so every
/// row of the column reads as a decimal number.
pub fn format_price(price: f64) -> String {
    if price.is_finite() && price.fract() == 0.0 {
        format!("{price:.1}")
    } else {
        price.to_string()
    }
}

/// One completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub timestamp: DateTime<Local>,
    pub price: f64,
    pub signal: Signal,
    pub order_status: String,
    /// Empty in the file when no order was observed or filled.
    pub side: Option<OrderSide>,
    pub instrument_id: Option<ProductId>,
    pub position_after: i64,
}

impl LedgerEntry {
    fn record(&self) -> [String; 7] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format_price(self.price),
            self.signal.to_string(),
            self.order_status.clone(),
            self.side.map(|s| s.to_string()).unwrap_or_default(),
            self.instrument_id.map(|p| p.to_string()).unwrap_or_default(),
            self.position_after.to_string(),
        ]
    }
}

pub struct LedgerWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl LedgerWriter {
    /// Open `path` for appending, creating it with a header if needed.
    pub fn open(path: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let is_empty = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_empty {
            writer.write_record(LEDGER_HEADER)?;
            writer.flush()?;
            info!(path = %path.display(), "Created ledger");
        } else {
            info!(path = %path.display(), "Appending to existing ledger");
        }

        Ok(Self {
            path,
            writer,
            rows_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows appended by this writer.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Append and flush one row.
    pub fn append(&mut self, entry: &LedgerEntry) -> PersistenceResult<()> {
        self.writer.write_record(entry.record())?;
        self.writer.flush()?;
        self.rows_written += 1;
        debug!(signal = %entry.signal, status = %entry.order_status, "Ledger row appended");
        Ok(())
    }

    pub fn flush(&mut self) -> PersistenceResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
