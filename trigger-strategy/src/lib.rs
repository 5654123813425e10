//! # Trigger Strategy
//!
//! Watches a price feed for one security and, the first time the price drops
//! strictly below a threshold, submits exactly one buy order and stops listening.
//!
//! ## Modules
//! - `strategy`: `TradingStrategy`, its lifecycle and equivalence key.
//! - `config`: `StrategyConfig` and the `Equivalence` policy.
//! - `dispatcher`: `OrderDispatcher`, a queued `ExecutionService` that moves
//!   submission off the strategy's critical section.
//! - `error`: `StrategyError`.
//!
//! ```
//! use std::sync::Arc;
//! use trading::testing::{RecordingExecutionService, RecordingPriceSource};
//! use trigger_strategy::{StrategyConfig, TradingStrategy};
//!
//! let executor = Arc::new(RecordingExecutionService::new());
//! let source = Arc::new(RecordingPriceSource::new());
//! let strategy = TradingStrategy::new(
//!     StrategyConfig::new("IBM", 100.0, 5000),
//!     executor.clone(),
//!     source.clone(),
//! );
//!
//! strategy.connect()?;
//! source.publish("IBM", 50.0)?;
//! source.publish("IBM", 40.0)?;
//!
//! assert_eq!(executor.times_called_with("ibm", 50.0, 5000), 1);
//! assert_eq!(executor.call_count(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod strategy;

pub use config::{Equivalence, StrategyConfig};
pub use dispatcher::OrderDispatcher;
pub use error::{Result, StrategyError};
pub use strategy::{Lifecycle, StrategyKey, TradingStrategy};
