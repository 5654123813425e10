use crate::config::{ExecutionMode, RunnerConfig};
use anyhow::{Context, Result};
use broker_gateway::{Fill, PaperExecutionService};
use dummy_feed::{InMemoryPriceSource, RandomWalk};
use log::{info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use trading::ExecutionService;
use trigger_strategy::{OrderDispatcher, TradingStrategy};

/// Outcome of one run, printed as JSON on exit.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub strategies: usize,
    pub fired: usize,
    pub fills: Vec<Fill>,
    pub cash: f64,
}

/// Wires the feed, the strategies and the paper backend, then publishes ticks
/// until every strategy has fired or `feed.max_ticks` is reached.
pub async fn run(config: &RunnerConfig) -> Result<RunSummary> {
    let source = Arc::new(InMemoryPriceSource::new());
    let paper = PaperExecutionService::new(config.execution.initial_cash);
    let paper = Arc::new(if config.execution.enforce_cash {
        paper.with_cash_check()
    } else {
        paper
    });

    let dispatcher = match config.execution.mode {
        ExecutionMode::Queued => Some(Arc::new(OrderDispatcher::spawn(paper.clone()))),
        ExecutionMode::Inline => None,
    };
    let executor: Arc<dyn ExecutionService> = match &dispatcher {
        Some(dispatcher) => dispatcher.clone(),
        None => paper.clone(),
    };

    let mut strategies = Vec::with_capacity(config.strategies.len());
    let mut seen = HashSet::new();
    for strategy_config in &config.strategies {
        let strategy =
            TradingStrategy::try_new(strategy_config.clone(), executor.clone(), source.clone())
                .with_context(|| format!("Invalid strategy {:?}", strategy_config))?;
        if !seen.insert(strategy.key()) {
            warn!("Skipping {}: an equivalent strategy is already running", strategy);
            continue;
        }
        strategy.connect().context("Failed to connect strategy")?;
        strategies.push(strategy);
    }
    info!(
        "{} strategies armed ({:?} execution)",
        strategies.len(),
        config.execution.mode
    );

    let mut walk = RandomWalk::new(
        config.feed_securities(),
        config.feed.start_price,
        config.feed.volatility,
        config.feed.seed,
    );
    let mut interval = (config.feed.tick_interval_ms > 0)
        .then(|| tokio::time::interval(Duration::from_millis(config.feed.tick_interval_ms)));

    let mut ticks = 0;
    while ticks < config.feed.max_ticks && strategies.iter().any(|s| !s.has_fired()) {
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }
        for update in walk.next_tick() {
            if let Err(e) = source.publish_update(&update) {
                warn!("Tick {} not fully handled: {}", ticks, e);
            }
        }
        ticks += 1;
    }
    source.close();

    if let Some(dispatcher) = dispatcher {
        let forwarded = dispatcher.shutdown().await?;
        info!("Dispatcher forwarded {} orders", forwarded);
    }

    let fired = strategies.iter().filter(|s| s.has_fired()).count();
    info!(
        "Run finished after {} ticks: {}/{} strategies fired",
        ticks,
        fired,
        strategies.len()
    );

    Ok(RunSummary {
        ticks,
        strategies: strategies.len(),
        fired,
        fills: paper.fills(),
        cash: paper.cash(),
    })
}
