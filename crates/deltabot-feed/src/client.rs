//! HTTP client for the exchange's public REST endpoints.
//!
//! Candles come from the market-data host, ticker and product lookups
//! from the trading host. The two may differ (production candles with
//! testnet trading).

use crate::error::{FeedError, FeedResult};
use crate::source::{BarSource, BoxFuture, PriceSource};
use chrono::{TimeZone, Utc};
use deltabot_core::{Bar, Clock, ProductId, Resolution, SystemClock};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const CANDLES_ENDPOINT: &str = "/v2/history/candles";

/// Envelope used by every exchange response.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<Value>,
}

/// Raw candle entry. Numeric fields may arrive as numbers or strings.
#[derive(Debug, Deserialize)]
struct RawCandle {
    time: Value,
    close: Value,
    #[serde(default)]
    volume: Option<Value>,
}

/// Read a JSON number or numeric string as `f64`.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parse a candles response body into ascending bars, keeping the last `window`.
pub fn parse_candles(body: &Value, window: usize) -> FeedResult<Vec<Bar>> {
    let result = body
        .get("result")
        .ok_or_else(|| FeedError::Parse("candles response has no result".to_string()))?;

    let entries = match result {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        _ => return Err(FeedError::Parse("candles result is not an array".to_string())),
    };

    let mut bars = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let raw: RawCandle = serde_json::from_value(entry.clone())
            .map_err(|e| FeedError::Parse(format!("candle {idx}: {e}")))?;

        let ts = value_as_f64(&raw.time)
            .ok_or_else(|| FeedError::Parse(format!("candle {idx}: bad time")))?
            as i64;
        let time = Utc
            .timestamp_opt(ts, 0)
            .single()
            .ok_or_else(|| FeedError::Parse(format!("candle {idx}: invalid timestamp {ts}")))?;

        let Some(close) = value_as_f64(&raw.close) else {
            warn!(idx, "Skipping candle without close");
            continue;
        };
        let volume = raw.volume.as_ref().and_then(value_as_f64).unwrap_or(0.0);

        bars.push(Bar::new(time, close, volume));
    }

    bars.sort_by_key(|b| b.time);
    let skip = bars.len().saturating_sub(window);
    Ok(bars.into_iter().skip(skip).collect())
}

/// Extract a positive price from a ticker result (`mark_price`, else `close`).
pub fn parse_ticker_price(result: &Value) -> FeedResult<f64> {
    let price = ["mark_price", "close"]
        .iter()
        .filter_map(|key| result.get(*key).and_then(value_as_f64))
        .find(|p| *p != 0.0)
        .unwrap_or(0.0);

    if !price.is_finite() || price <= 0.0 {
        return Err(FeedError::InvalidTicker(format!("price {price}")));
    }
    Ok(price)
}

/// Client for the exchange REST API.
pub struct DeltaRestClient {
    /// HTTP client.
    client: Client,
    /// Host serving candles.
    market_data_url: String,
    /// Host serving tickers, products and orders.
    trading_url: String,
    clock: Arc<dyn Clock>,
}

impl DeltaRestClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `market_data_url` - e.g. "https://api.delta.exchange"
    /// * `trading_url` - e.g. "https://cdn-ind.testnet.deltaex.org"
    /// * `user_agent` - sent on every request
    pub fn new(
        market_data_url: impl Into<String>,
        trading_url: impl Into<String>,
        user_agent: &str,
    ) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            market_data_url: market_data_url.into().trim_end_matches('/').to_string(),
            trading_url: trading_url.into().trim_end_matches('/').to_string(),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used for the candle time range.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> FeedResult<Value> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FeedError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::HttpClient(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| FeedError::Parse(format!("Failed to parse response: {e}")))
    }

    /// Fetch the last `window` candles for a symbol.
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        window: usize,
    ) -> FeedResult<Vec<Bar>> {
        let end = self.clock.now_secs();
        let start = end - window as i64 * resolution.step_secs();
        let url = format!("{}{}", self.market_data_url, CANDLES_ENDPOINT);

        let query = [
            ("symbol", symbol.to_string()),
            ("resolution", resolution.to_string()),
            ("start", start.to_string()),
            ("end", end.to_string()),
        ];

        let body = self.get_json(&url, &query).await?;
        let bars = parse_candles(&body, window)?;

        if bars.is_empty() {
            warn!(symbol, %resolution, start, end, "Empty candles result");
        } else {
            debug!(symbol, %resolution, count = bars.len(), "Fetched candles");
        }

        Ok(bars)
    }

    /// Fetch the current ticker price for a symbol.
    pub async fn fetch_ticker(&self, symbol: &str) -> FeedResult<f64> {
        let url = format!("{}/v2/tickers/{}", self.trading_url, symbol);
        let body: Envelope = serde_json::from_value(self.get_json(&url, &[]).await?)?;
        let result = body
            .result
            .ok_or_else(|| FeedError::InvalidTicker(format!("no ticker for {symbol}")))?;
        parse_ticker_price(&result)
    }

    /// Resolve a symbol to its numeric product id.
    pub async fn fetch_product_id(&self, symbol: &str) -> FeedResult<ProductId> {
        let url = format!("{}/v2/products/{}", self.trading_url, symbol);
        info!(url = %url, "Resolving product id");

        let body: Envelope = serde_json::from_value(self.get_json(&url, &[]).await?)?;
        let id = body
            .result
            .as_ref()
            .and_then(|r| r.get("id"))
            .and_then(Value::as_u64)
            .ok_or_else(|| FeedError::Parse(format!("no product id for {symbol}")))?;

        Ok(ProductId(id))
    }
}

impl BarSource for DeltaRestClient {
    fn fetch_bars<'a>(
        &'a self,
        symbol: &'a str,
        resolution: Resolution,
        window: usize,
    ) -> BoxFuture<'a, FeedResult<Vec<Bar>>> {
        Box::pin(self.fetch_candles(symbol, resolution, window))
    }
}

impl PriceSource for DeltaRestClient {
    fn fetch_price<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, FeedResult<f64>> {
        Box::pin(self.fetch_ticker(symbol))
    }
}
