use crate::error::{Result, StrategyError};
use log::{error, info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use trading::{BuyOrder, ExecutionService, Lots};

/// Queued `ExecutionService`.
///
/// `buy` only enqueues the order and returns, so a strategy using this as its
/// executor releases its lock right after the trigger commits. A background task
/// forwards queued orders to the wrapped service on the blocking pool. Downstream
/// failures are logged and dropped, never retried.
pub struct OrderDispatcher {
    sender: Mutex<Option<mpsc::UnboundedSender<BuyOrder>>>,
    worker: Mutex<Option<JoinHandle<usize>>>,
}

impl OrderDispatcher {
    /// Starts the forwarding task. Must be called from within a Tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `inner` - The service that actually submits orders.
    pub fn spawn(inner: Arc<dyn ExecutionService>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(Self::forward(receiver, inner));
        Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    async fn forward(
        mut receiver: mpsc::UnboundedReceiver<BuyOrder>,
        inner: Arc<dyn ExecutionService>,
    ) -> usize {
        let mut forwarded = 0;
        while let Some(order) = receiver.recv().await {
            let service = inner.clone();
            let submitted = order.clone();
            match tokio::task::spawn_blocking(move || service.submit(&submitted)).await {
                Ok(Ok(())) => {
                    forwarded += 1;
                    info!(
                        "Forwarded buy {} x {} @ {}",
                        order.security, order.lots, order.price
                    );
                }
                Ok(Err(e)) => error!("Buy {} @ {} failed: {:#}", order.security, order.price, e),
                Err(e) => error!("Buy {} @ {} panicked: {}", order.security, order.price, e),
            }
        }
        forwarded
    }

    /// True until `shutdown` has been called.
    pub fn is_open(&self) -> bool {
        self.sender
            .lock()
            .map(|sender| sender.is_some())
            .unwrap_or(false)
    }

    /// Closes the queue, waits for every queued order to be forwarded and
    /// returns how many were accepted downstream.
    ///
    /// Calling it again returns `Ok(0)`.
    pub async fn shutdown(&self) -> Result<usize> {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
        let worker = self.worker.lock().ok().and_then(|mut worker| worker.take());
        match worker {
            Some(handle) => Ok(handle.await?),
            None => Ok(0),
        }
    }
}

impl ExecutionService for OrderDispatcher {
    fn buy(&self, security: &str, price: f64, lots: Lots) -> anyhow::Result<()> {
        let sender = self
            .sender
            .lock()
            .map_err(|_| anyhow::anyhow!("dispatcher lock poisoned"))?;
        let Some(sender) = sender.as_ref() else {
            warn!("Dropping buy {} @ {}: dispatcher closed", security, price);
            return Err(StrategyError::DispatcherClosed.into());
        };
        sender
            .send(BuyOrder::new(security, price, lots))
            .map_err(|_| StrategyError::DispatcherClosed)?;
        Ok(())
    }
}
