use crate::config::{ExecutionMode, RunnerConfig};
use clap::Parser;
use std::path::PathBuf;

/// Command-line overrides. Anything not given here comes from the config file
/// or `TRIGGER__*` environment variables.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log filter (e.g. "info", "debug", "trigger_strategy=debug")
    #[arg(long)]
    pub log_level: Option<String>,

    /// Stop after this many feed ticks even if strategies are still armed
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Seed for the synthetic feed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Submit orders through the queued dispatcher
    #[arg(long)]
    pub queued: bool,
}

impl Args {
    pub fn apply(&self, config: &mut RunnerConfig) {
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(max_ticks) = self.max_ticks {
            config.feed.max_ticks = max_ticks;
        }
        if let Some(seed) = self.seed {
            config.feed.seed = Some(seed);
        }
        if self.queued {
            config.execution.mode = ExecutionMode::Queued;
        }
    }
}
