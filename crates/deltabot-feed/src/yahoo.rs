//! Reference-instrument bars from Yahoo's v8 chart API.
//!
//! Gold futures (`GC=F`) and the dollar index (`DX=F`) are not listed on
//! the exchange, so they come from here.

use crate::error::{FeedError, FeedResult};
use crate::source::{BarSource, BoxFuture};
use chrono::DateTime;
use deltabot_core::{Bar, Clock, Resolution, SystemClock};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Query window for one chart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartRange {
    /// Relative range such as `5d`.
    Range(&'static str),
    /// Absolute `[period1, period2]` in unix seconds.
    Period { start: i64, end: i64 },
}

/// Interval string and range for a resolution.
///
/// Minute resolutions ask for the last five days and rely on the tail cut;
/// hourly and daily ask for slightly more than `window` bars.
pub fn chart_query(resolution: Resolution, window: usize, now_secs: i64) -> (&'static str, ChartRange) {
    let window = window as i64;
    match resolution {
        Resolution::OneMinute => ("1m", ChartRange::Range("5d")),
        Resolution::FiveMinutes => ("5m", ChartRange::Range("5d")),
        Resolution::FifteenMinutes => ("15m", ChartRange::Range("5d")),
        Resolution::OneHour => (
            "60m",
            ChartRange::Period {
                start: now_secs - (window + 5) * 3600,
                end: now_secs,
            },
        ),
        Resolution::OneDay => (
            "1d",
            ChartRange::Period {
                start: now_secs - (window + 2) * 86_400,
                end: now_secs,
            },
        ),
    }
}

/// Parse a chart response body into ascending bars, keeping the last `window`.
pub fn parse_chart(symbol: &str, body: &str, window: usize) -> FeedResult<Vec<Bar>> {
    let resp: ChartResponse = serde_json::from_str(body)?;

    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) => FeedError::DataUnavailable(format!(
            "{symbol}: {}: {}",
            err.code, err.description
        )),
        None => FeedError::Parse(format!("{symbol}: empty result with no error")),
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| FeedError::DataUnavailable(format!("{symbol}: result array is empty")))?;

    let timestamps = data.timestamp.unwrap_or_default();
    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        // Non-trading minutes come back as null
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        let time = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| FeedError::Parse(format!("{symbol}: invalid timestamp {ts}")))?;
        bars.push(Bar::close_only(time, close));
    }

    if bars.is_empty() {
        return Err(FeedError::DataUnavailable(format!("no bars returned for {symbol}")));
    }

    bars.sort_by_key(|b| b.time);
    let skip = bars.len().saturating_sub(window);
    Ok(bars.into_iter().skip(skip).collect())
}

/// Yahoo chart API client.
pub struct YahooChartClient {
    client: Client,
    base_url: String,
    clock: Arc<dyn Clock>,
}

impl YahooChartClient {
    /// # Arguments
    /// * `base_url` - e.g. "https://query2.finance.yahoo.com"
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch the last `window` closes for a Yahoo symbol.
    pub async fn fetch_chart(
        &self,
        symbol: &str,
        resolution: Resolution,
        window: usize,
    ) -> FeedResult<Vec<Bar>> {
        let (interval, range) = chart_query(resolution, window, self.clock.now_secs());
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let mut query = vec![("interval", interval.to_string())];
        match range {
            ChartRange::Range(r) => query.push(("range", r.to_string())),
            ChartRange::Period { start, end } => {
                query.push(("period1", start.to_string()));
                query.push(("period2", end.to_string()));
            }
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| FeedError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FeedError::HttpClient(format!("Failed to read body: {e}")))?;

        if !status.is_success() && !body.contains("\"chart\"") {
            return Err(FeedError::HttpClient(format!("HTTP {status} for {symbol}")));
        }

        let bars = parse_chart(symbol, &body, window)?;
        debug!(symbol, interval, count = bars.len(), "Fetched reference bars");
        Ok(bars)
    }
}

impl BarSource for YahooChartClient {
    fn fetch_bars<'a>(
        &'a self,
        symbol: &'a str,
        resolution: Resolution,
        window: usize,
    ) -> BoxFuture<'a, FeedResult<Vec<Bar>>> {
        Box::pin(self.fetch_chart(symbol, resolution, window))
    }
}
