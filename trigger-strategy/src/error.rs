use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by a `TradingStrategy` and its dispatcher.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// Rejected by `StrategyConfig::validate`.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The price source failed to register or deregister the strategy.
    #[error("price source error: {0}")]
    Feed(#[source] BoxError),

    /// The execution service failed to accept the buy order.
    #[error("execution error: {0}")]
    Execution(#[source] BoxError),

    /// The dispatcher queue has been shut down.
    #[error("order dispatcher is closed")]
    DispatcherClosed,

    /// The dispatcher's background worker panicked or was cancelled.
    #[error("order dispatcher worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl StrategyError {
    pub(crate) fn feed(err: anyhow::Error) -> Self {
        StrategyError::Feed(err.into())
    }

    pub(crate) fn execution(err: anyhow::Error) -> Self {
        StrategyError::Execution(err.into())
    }
}

/// A specialized Result type for strategy operations.
pub type Result<T> = std::result::Result<T, StrategyError>;
