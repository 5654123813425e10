mod args;
mod config;
mod runner;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use crate::config::RunnerConfig;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        RunnerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();
    info!("=== Trigger Runner Starting ===");
    info!(
        "{} strategies configured, feed max {} ticks",
        config.strategies.len(),
        config.feed.max_ticks
    );

    let summary = runner::run(&config).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
