//! Application configuration.

use std::path::Path;
use std::time::Duration;

use deltabot_detector::DetectorConfig;
use deltabot_feed::InstrumentSymbols;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Signals and ledger only, no orders.
    #[default]
    Observation,
    /// Orders are signed and submitted.
    Trading,
}

/// Traded and reference instruments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Resolved from the exchange at startup when unset.
    #[serde(default)]
    pub product_id: Option<u64>,
    /// Contracts per order.
    #[serde(default = "default_trade_size")]
    pub trade_size: i64,
    #[serde(default = "default_gold_symbol")]
    pub gold_symbol: String,
    #[serde(default = "default_usd_symbol")]
    pub usd_symbol: String,
}

fn default_symbol() -> String {
    "BTCUSD".to_string()
}

fn default_trade_size() -> i64 {
    1
}

fn default_gold_symbol() -> String {
    "GC=F".to_string()
}

fn default_usd_symbol() -> String {
    "DX=F".to_string()
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            product_id: None,
            trade_size: default_trade_size(),
            gold_symbol: default_gold_symbol(),
            usd_symbol: default_usd_symbol(),
        }
    }
}

impl InstrumentConfig {
    pub fn symbols(&self) -> InstrumentSymbols {
        InstrumentSymbols {
            primary: self.symbol.clone(),
            gold: self.gold_symbol.clone(),
            usd: self.usd_symbol.clone(),
        }
    }
}

/// Upstream hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Candles are always read from production.
    #[serde(default = "default_market_data_url")]
    pub market_data_url: String,
    /// Tickers, products and orders.
    #[serde(default = "default_trading_url")]
    pub trading_url: String,
    #[serde(default = "default_yahoo_url")]
    pub yahoo_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_market_data_url() -> String {
    "https://api.delta.exchange".to_string()
}

fn default_trading_url() -> String {
    "https://cdn-ind.testnet.deltaex.org".to_string()
}

fn default_yahoo_url() -> String {
    "https://query2.finance.yahoo.com".to_string()
}

fn default_user_agent() -> String {
    "delta-forward-tester/1.0".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            market_data_url: default_market_data_url(),
            trading_url: default_trading_url(),
            yahoo_url: default_yahoo_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// Loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Pause after a completed cycle (ms). Default: 60,000.
    #[serde(default = "default_fetch_interval_ms")]
    pub fetch_interval_ms: u64,
    /// Pause after a failed cycle (ms). Default: 10,000.
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,
}

fn default_fetch_interval_ms() -> u64 {
    60_000
}

fn default_error_backoff_ms() -> u64 {
    10_000
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            fetch_interval_ms: default_fetch_interval_ms(),
            error_backoff_ms: default_error_backoff_ms(),
        }
    }
}

impl CycleConfig {
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_millis(self.fetch_interval_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Linear model JSON. Without a loadable model every signal is `hold`.
    #[serde(default = "default_model_path")]
    pub model_path: String,
    #[serde(default = "default_state_path")]
    pub state_path: String,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,
}

fn default_model_path() -> String {
    "model/linear_model.json".to_string()
}

fn default_state_path() -> String {
    "position_state.json".to_string()
}

fn default_ledger_path() -> String {
    "paper_trading_log.csv".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            state_path: default_state_path(),
            ledger_path: default_ledger_path(),
        }
    }
}

/// Names of the environment variables holding the API key pair.
/// The key pair itself never appears in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_api_secret_env")]
    pub api_secret_env: String,
}

fn default_api_key_env() -> String {
    "DELTA_API_KEY".to_string()
}

fn default_api_secret_env() -> String {
    "DELTA_API_SECRET".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            api_secret_env: default_api_secret_env(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: OperatingMode,
    #[serde(default)]
    pub instrument: InstrumentConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.instrument.symbol.trim().is_empty() {
            return Err(AppError::Config("instrument.symbol is empty".to_string()));
        }
        if self.instrument.trade_size <= 0 {
            return Err(AppError::Config(format!(
                "instrument.trade_size must be positive, got {}",
                self.instrument.trade_size
            )));
        }
        if self.cycle.fetch_interval_ms == 0 {
            return Err(AppError::Config(
                "cycle.fetch_interval_ms must be positive".to_string(),
            ));
        }
        self.detector.validate().map_err(AppError::Config)
    }

    pub fn is_observation_mode(&self) -> bool {
        self.mode == OperatingMode::Observation
    }
}
