//! Main application orchestration.
//!
//! One cycle: ticker price → signal → position state machine (which may
//! place an order) → ledger row. Cycles never overlap. A failed cycle is
//! logged and followed by the shorter error backoff; the loop only ends on
//! the shutdown signal.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use deltabot_core::ProductId;
use deltabot_detector::{LinearScorer, Scorer, SignalDecision, SignalGenerator};
use deltabot_executor::{Credentials, OrderGateway, RequestSigner, RestOrderGateway};
use deltabot_feed::{DeltaRestClient, MarketDataAdapter, PriceSource, YahooChartClient};
use deltabot_persistence::{LedgerEntry, LedgerWriter};
use deltabot_position::{PositionStateMachine, PositionStore, Transition};
use deltabot_telemetry::{Metrics, SessionReporter};
use tracing::{error, info, warn};

use crate::config::{AppConfig, OperatingMode};
use crate::error::{AppError, AppResult};

/// Product id recorded when observing without a resolvable product.
const UNRESOLVED_PRODUCT: ProductId = ProductId(0);

/// What one completed cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub price: f64,
    pub decision: SignalDecision,
    pub transition: Transition,
    pub position_after: i64,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    prices: Arc<dyn PriceSource>,
    generator: SignalGenerator,
    machine: PositionStateMachine,
    /// `None` in observation mode.
    gateway: Option<Arc<dyn OrderGateway>>,
    ledger: LedgerWriter,
    reporter: SessionReporter,
    cycles: u64,
}

impl Application {
    /// Wire the application from already-built collaborators.
    ///
    /// Loads the persisted position and opens the ledger.
    pub fn from_parts(
        config: AppConfig,
        prices: Arc<dyn PriceSource>,
        generator: SignalGenerator,
        gateway: Option<Arc<dyn OrderGateway>>,
        product_id: ProductId,
    ) -> AppResult<Self> {
        let store = PositionStore::new(&config.paths.state_path);
        let machine =
            PositionStateMachine::load(store, product_id, config.instrument.trade_size);
        let ledger = LedgerWriter::open(&config.paths.ledger_path)?;

        Ok(Self {
            config,
            prices,
            generator,
            machine,
            gateway,
            ledger,
            reporter: SessionReporter::new(),
            cycles: 0,
        })
    }

    /// Build every collaborator from configuration.
    ///
    /// In trading mode missing credentials or an unresolvable product abort
    /// startup. A model that fails to load only degrades signals to `hold`.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        let endpoints = &config.endpoints;
        let exchange = Arc::new(DeltaRestClient::new(
            &endpoints.market_data_url,
            &endpoints.trading_url,
            &endpoints.user_agent,
        )?);
        let yahoo = Arc::new(YahooChartClient::new(
            &endpoints.yahoo_url,
            &endpoints.user_agent,
        )?);

        let adapter = Arc::new(MarketDataAdapter::new(
            exchange.clone(),
            yahoo,
            config.instrument.symbols(),
        ));
        let scorer = load_scorer(&config.paths.model_path);
        let generator = SignalGenerator::new(adapter, scorer, config.detector.clone());

        let product_id = resolve_product(&config, &exchange).await?;

        let gateway: Option<Arc<dyn OrderGateway>> = match config.mode {
            OperatingMode::Observation => None,
            OperatingMode::Trading => {
                let credentials = Credentials::from_env(
                    &config.credentials.api_key_env,
                    &config.credentials.api_secret_env,
                )?;
                let signer = RequestSigner::new(credentials);
                Some(Arc::new(RestOrderGateway::new(
                    &endpoints.trading_url,
                    &endpoints.user_agent,
                    signer,
                )?))
            }
        };

        info!(
            mode = ?config.mode,
            symbol = %config.instrument.symbol,
            %product_id,
            trade_size = config.instrument.trade_size,
            resolution = %config.detector.resolution,
            "Application configured"
        );

        Self::from_parts(config, exchange, generator, gateway, product_id)
    }

    pub fn position(&self) -> i64 {
        self.machine.position()
    }

    /// Run one decision cycle.
    pub async fn run_cycle(&mut self) -> AppResult<CycleReport> {
        let symbol = &self.config.instrument.symbol;
        let price = self.prices.fetch_price(symbol).await?;
        Metrics::price_set(price);

        let decision = self.generator.generate().await;
        let transition = self
            .machine
            .on_signal(decision.signal, self.gateway.as_deref())
            .await;
        let position_after = self.machine.position();

        info!(
            price,
            signal = %decision.signal,
            status = transition.order_status(),
            position = position_after,
            "Cycle complete"
        );

        let entry = LedgerEntry {
            timestamp: Local::now(),
            price,
            signal: decision.signal,
            order_status: transition.order_status().to_string(),
            side: transition.side(),
            instrument_id: transition.instrument_id(),
            position_after,
        };
        if let Err(e) = self.ledger.append(&entry) {
            Metrics::persistence_failed("ledger");
            return Err(e.into());
        }

        Ok(CycleReport {
            price,
            decision,
            transition,
            position_after,
        })
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` resolves. A cycle in progress always completes.
    pub async fn run_until<F>(mut self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()>,
    {
        info!(mode = ?self.config.mode, position = self.position(), "Entering main loop");
        tokio::pin!(shutdown);

        loop {
            let pause = self.cycle_and_pause().await;
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.shutdown()
    }

    async fn cycle_and_pause(&mut self) -> Duration {
        let started = Instant::now();
        let result = self.run_cycle().await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.cycles += 1;

        match result {
            Ok(_) => {
                Metrics::cycle_completed(true, elapsed_ms);
                self.config.cycle.fetch_interval()
            }
            Err(e) => {
                Metrics::cycle_completed(false, elapsed_ms);
                warn!(error = %e, backoff_ms = self.config.cycle.error_backoff_ms, "Cycle failed");
                self.config.cycle.error_backoff()
            }
        }
    }

    fn shutdown(mut self) -> AppResult<()> {
        info!(
            cycles = self.cycles,
            position = self.position(),
            ledger = %self.ledger.path().display(),
            rows = self.ledger.rows_written(),
            "Shutting down"
        );
        if let Err(e) = self.ledger.flush() {
            error!(error = %e, "Failed to flush ledger");
        }
        self.reporter.log_summary();
        Ok(())
    }
}

fn load_scorer(path: &str) -> Option<Arc<dyn Scorer>> {
    match LinearScorer::from_file(path) {
        Ok(scorer) => {
            info!(path, "Model loaded");
            Some(Arc::new(scorer))
        }
        Err(e) => {
            error!(path, error = %e, "Failed to load model, every signal will be hold");
            None
        }
    }
}

async fn resolve_product(config: &AppConfig, exchange: &DeltaRestClient) -> AppResult<ProductId> {
    if let Some(id) = config.instrument.product_id {
        return Ok(ProductId(id));
    }

    let symbol = &config.instrument.symbol;
    match exchange.fetch_product_id(symbol).await {
        Ok(id) => {
            info!(symbol = %symbol, product_id = %id, "Product resolved");
            Ok(id)
        }
        Err(e) if !config.is_observation_mode() => Err(AppError::Startup(format!(
            "product id for {symbol} not found: {e}"
        ))),
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "Product id unresolved, observing without it");
            Ok(UNRESOLVED_PRODUCT)
        }
    }
}
