use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use trigger_strategy::StrategyConfig;

/// Prefix for environment overrides, e.g. `TRIGGER__FEED__MAX_TICKS=500`.
pub const ENV_PREFIX: &str = "TRIGGER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Strategies call the paper backend while holding their lock.
    #[default]
    Inline,
    /// Strategies enqueue onto an `OrderDispatcher`.
    Queued,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Securities to generate prices for. Empty means "every configured strategy's security".
    pub securities: Vec<String>,
    pub start_price: f64,
    /// Maximum relative move per tick.
    pub volatility: f64,
    pub max_ticks: u64,
    /// Pause between ticks. 0 publishes as fast as possible.
    pub tick_interval_ms: u64,
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            securities: Vec::new(),
            start_price: 120.0,
            volatility: 0.02,
            max_ticks: 1_000,
            tick_interval_ms: 10,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExecutionConfig {
    pub mode: ExecutionMode,
    pub initial_cash: f64,
    /// Reject buys the paper book cannot pay for.
    pub enforce_cash: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Inline,
            initial_cash: 1_000_000.0,
            enforce_cash: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    pub log_level: String,
    pub feed: FeedConfig,
    pub execution: ExecutionConfig,
    pub strategies: Vec<StrategyConfig>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            feed: FeedConfig::default(),
            execution: ExecutionConfig::default(),
            strategies: vec![
                StrategyConfig::new("IBM", 100.0, 5000),
                StrategyConfig::new("IBM", 95.0, 2500),
            ],
        }
    }
}

impl RunnerConfig {
    /// Loads the configuration: built-in defaults, then `path` (TOML, if given),
    /// then `TRIGGER__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );
        builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Failed to deserialize RunnerConfig")
    }

    /// Securities the feed should publish.
    pub fn feed_securities(&self) -> Vec<String> {
        if !self.feed.securities.is_empty() {
            return self.feed.securities.clone();
        }
        let mut securities: Vec<String> = Vec::new();
        for strategy in &self.strategies {
            let security = strategy.security().to_string();
            if !securities
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&security))
            {
                securities.push(security);
            }
        }
        securities
    }
}
