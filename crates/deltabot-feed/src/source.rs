//! Source traits for market data.
//!
//! Provides trait-based abstractions over the upstream HTTP APIs.
//! This allows for:
//! - Dependency injection for testing
//! - Swapping the reference-instrument provider without touching callers

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use deltabot_core::{Bar, Resolution};
use parking_lot::Mutex;

use crate::error::{FeedError, FeedResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Anything that can return the most recent bars for a symbol.
pub trait BarSource: Send + Sync {
    /// Fetch up to `window` most recent bars at `resolution`, ascending by time.
    fn fetch_bars<'a>(
        &'a self,
        symbol: &'a str,
        resolution: Resolution,
        window: usize,
    ) -> BoxFuture<'a, FeedResult<Vec<Bar>>>;
}

/// Anything that can quote the current price of a symbol.
pub trait PriceSource: Send + Sync {
    /// Current tradable price. Errors when missing or non-positive.
    fn fetch_price<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, FeedResult<f64>>;
}

/// Scripted response for a mock source.
#[derive(Debug, Clone)]
pub enum MockResponse<T> {
    Ok(T),
    Unavailable(String),
    Malformed(String),
}

impl<T: Clone> MockResponse<T> {
    fn to_result(&self) -> FeedResult<T> {
        match self {
            MockResponse::Ok(v) => Ok(v.clone()),
            MockResponse::Unavailable(msg) => Err(FeedError::DataUnavailable(msg.clone())),
            MockResponse::Malformed(msg) => Err(FeedError::Parse(msg.clone())),
        }
    }
}

/// Mock bar source for testing.
///
/// Symbols without a scripted response fail with `DataUnavailable`.
#[derive(Debug, Default)]
pub struct MockBarSource {
    responses: Mutex<HashMap<String, MockResponse<Vec<Bar>>>>,
    calls: AtomicUsize,
}

impl MockBarSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the bars returned for a symbol.
    pub fn set_bars(&self, symbol: &str, bars: Vec<Bar>) {
        self.responses
            .lock()
            .insert(symbol.to_string(), MockResponse::Ok(bars));
    }

    /// Script a failure for a symbol.
    pub fn set_unavailable(&self, symbol: &str) {
        self.responses.lock().insert(
            symbol.to_string(),
            MockResponse::Unavailable(format!("{symbol} unavailable")),
        );
    }

    /// Script an unparsable response for a symbol.
    pub fn set_malformed(&self, symbol: &str) {
        self.responses.lock().insert(
            symbol.to_string(),
            MockResponse::Malformed(format!("{symbol} body is not a candle list")),
        );
    }

    /// Number of fetches made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BarSource for MockBarSource {
    fn fetch_bars<'a>(
        &'a self,
        symbol: &'a str,
        _resolution: Resolution,
        window: usize,
    ) -> BoxFuture<'a, FeedResult<Vec<Bar>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .responses
            .lock()
            .get(symbol)
            .map(MockResponse::to_result)
            .unwrap_or_else(|| Err(FeedError::DataUnavailable(format!("no script for {symbol}"))))
            .map(|bars| {
                let skip = bars.len().saturating_sub(window);
                bars.into_iter().skip(skip).collect()
            });
        Box::pin(async move { result })
    }
}

/// Mock price source for testing.
#[derive(Debug)]
pub struct MockPriceSource {
    next: Mutex<MockResponse<f64>>,
}

impl MockPriceSource {
    pub fn new(price: f64) -> Self {
        Self {
            next: Mutex::new(MockResponse::Ok(price)),
        }
    }

    pub fn set_price(&self, price: f64) {
        *self.next.lock() = MockResponse::Ok(price);
    }

    pub fn set_unavailable(&self) {
        *self.next.lock() = MockResponse::Unavailable("ticker unavailable".to_string());
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_price<'a>(&'a self, _symbol: &'a str) -> BoxFuture<'a, FeedResult<f64>> {
        let result = self.next.lock().to_result().and_then(|price| {
            if price.is_finite() && price > 0.0 {
                Ok(price)
            } else {
                Err(FeedError::InvalidTicker(format!("price {price}")))
            }
        });
        Box::pin(async move { result })
    }
}
