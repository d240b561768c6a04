//! Decision ledger for deltabot.
//!
//! One CSV row per completed cycle, appended and flushed immediately.
//! Existing rows are never rewritten.

pub mod error;
pub mod ledger;

pub use error::{PersistenceError, PersistenceResult};
pub use ledger::{format_price, LedgerEntry, LedgerWriter, LEDGER_HEADER, TIMESTAMP_FORMAT};
