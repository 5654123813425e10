use crate::model::order::{BuyOrder, Lots};
use std::sync::Arc;

/// Submits buy orders to whatever backend executes them.
pub trait ExecutionService: Send + Sync {
    /// Called when a strategy decides to buy.
    ///
    /// # Arguments
    ///
    /// * `security` - The canonical security identifier.
    /// * `price` - The execution price.
    /// * `lots` - The quantity to buy.
    ///
    /// # Returns
    ///
    /// * `Err` if submission failed. Callers propagate it; nothing is retried.
    fn buy(&self, security: &str, price: f64, lots: Lots) -> anyhow::Result<()>;

    /// Convenience wrapper taking a prepared order.
    fn submit(&self, order: &BuyOrder) -> anyhow::Result<()> {
        self.buy(order.get_security(), order.get_price(), order.get_lots())
    }
}

impl<T: ExecutionService + ?Sized> ExecutionService for Arc<T> {
    fn buy(&self, security: &str, price: f64, lots: Lots) -> anyhow::Result<()> {
        (**self).buy(security, price, lots)
    }
}
