//! Market data adapter.
//!
//! Combines the exchange (primary instrument) and the reference provider
//! behind one interface. Primary failures surface as retriable errors;
//! reference failures degrade to a flat series so the feature vector keeps
//! its shape.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use deltabot_core::{Bar, Clock, Resolution, SystemClock};
use tracing::warn;

use crate::error::{FeedError, FeedResult};
use crate::source::BarSource;

/// Close used by the synthetic reference series.
pub const FLAT_FALLBACK_CLOSE: f64 = 1.0;

/// The three instruments a cycle needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Primary,
    Gold,
    Usd,
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Gold => f.write_str("gold"),
            Self::Usd => f.write_str("usd"),
        }
    }
}

/// Symbols for each instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentSymbols {
    pub primary: String,
    pub gold: String,
    pub usd: String,
}

impl Default for InstrumentSymbols {
    fn default() -> Self {
        Self {
            primary: "BTCUSD".to_string(),
            gold: "GC=F".to_string(),
            usd: "DX=F".to_string(),
        }
    }
}

impl InstrumentSymbols {
    pub fn symbol(&self, instrument: Instrument) -> &str {
        match instrument {
            Instrument::Primary => &self.primary,
            Instrument::Gold => &self.gold,
            Instrument::Usd => &self.usd,
        }
    }
}

/// Bars for all three instruments from one fetch round.
#[derive(Debug, Clone, Default)]
pub struct MarketSeries {
    pub primary: Vec<Bar>,
    pub gold: Vec<Bar>,
    pub usd: Vec<Bar>,
}

/// `window` bars at a constant close, spaced by the resolution, last at `now`.
pub fn flat_fallback(resolution: Resolution, window: usize, now: DateTime<Utc>) -> Vec<Bar> {
    let step = resolution.step_secs();
    (0..window)
        .rev()
        .map(|i| Bar::close_only(now - Duration::seconds(step * i as i64), FLAT_FALLBACK_CLOSE))
        .collect()
}

/// Fetches bars for the primary and reference instruments.
pub struct MarketDataAdapter {
    primary: Arc<dyn BarSource>,
    reference: Arc<dyn BarSource>,
    symbols: InstrumentSymbols,
    clock: Arc<dyn Clock>,
}

impl MarketDataAdapter {
    pub fn new(
        primary: Arc<dyn BarSource>,
        reference: Arc<dyn BarSource>,
        symbols: InstrumentSymbols,
    ) -> Self {
        Self {
            primary,
            reference,
            symbols,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn symbols(&self) -> &InstrumentSymbols {
        &self.symbols
    }

    /// Primary instrument bars. An empty result is `DataUnavailable`.
    pub async fn fetch_primary(&self, resolution: Resolution, window: usize) -> FeedResult<Vec<Bar>> {
        let symbol = &self.symbols.primary;
        let bars = self.primary.fetch_bars(symbol, resolution, window).await?;
        if bars.is_empty() {
            return Err(FeedError::DataUnavailable(format!(
                "no {resolution} bars for {symbol}"
            )));
        }
        Ok(bars)
    }

    /// Reference instrument bars, or the flat fallback on any failure.
    pub async fn fetch_reference(
        &self,
        instrument: Instrument,
        resolution: Resolution,
        window: usize,
    ) -> Vec<Bar> {
        let symbol = self.symbols.symbol(instrument);
        let fetched = self
            .reference
            .fetch_bars(symbol, resolution, window)
            .await
            .and_then(|bars| {
                if bars.is_empty() {
                    Err(FeedError::DataUnavailable(format!("no bars for {symbol}")))
                } else {
                    Ok(bars)
                }
            });

        match fetched {
            Ok(bars) => bars,
            Err(e) => {
                warn!(
                    %instrument,
                    symbol,
                    error = %e,
                    "Reference data unavailable, using flat fallback"
                );
                flat_fallback(resolution, window, self.clock.now_utc())
            }
        }
    }

    /// Fetch all three series for one cycle.
    pub async fn fetch_all(&self, resolution: Resolution, window: usize) -> FeedResult<MarketSeries> {
        let primary = self.fetch_primary(resolution, window).await?;
        let gold = self.fetch_reference(Instrument::Gold, resolution, window).await;
        let usd = self.fetch_reference(Instrument::Usd, resolution, window).await;
        Ok(MarketSeries { primary, gold, usd })
    }
}
