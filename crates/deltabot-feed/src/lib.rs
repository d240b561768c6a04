//! Market data adapter for deltabot.
//!
//! Pulls recent bars for the primary instrument from the exchange REST API
//! and for the gold and dollar-index reference instruments from Yahoo's
//! chart API. Also resolves the tradable ticker price and product id.

pub mod adapter;
pub mod client;
pub mod error;
pub mod source;
pub mod yahoo;

pub use adapter::{
    flat_fallback, Instrument, InstrumentSymbols, MarketDataAdapter, MarketSeries,
    FLAT_FALLBACK_CLOSE,
};
pub use client::DeltaRestClient;
pub use error::{FeedError, FeedResult};
pub use source::{BarSource, BoxFuture, MockBarSource, MockPriceSource, PriceSource};
pub use yahoo::YahooChartClient;
