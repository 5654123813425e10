use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use trading::{same_listener, PriceListener, PriceSource, PriceUpdate};

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Price source is closed")]
    Closed,
    #[error("Listener failed on {security} @ {price}: {source}")]
    Listener {
        security: String,
        price: f64,
        source: anyhow::Error,
    },
}

/// In-process `PriceSource`.
///
/// Listeners are snapshotted before each publish and called outside the
/// registry lock, so a listener may deregister itself while handling a price.
#[derive(Default)]
pub struct InMemoryPriceSource {
    listeners: Mutex<Vec<Arc<dyn PriceListener>>>,
    closed: AtomicBool,
}

impl InMemoryPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Vec<Arc<dyn PriceListener>>> {
        // A listener panicking mid-publish cannot leave the Vec half-updated.
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Delivers one price to every current listener.
    ///
    /// Every listener sees the price even if an earlier one fails; the first
    /// failure is returned afterwards.
    ///
    /// # Returns
    ///
    /// * `Ok(n)` - The number of listeners the price was delivered to.
    pub fn publish(&self, security: &str, price: f64) -> Result<usize, FeedError> {
        if self.is_closed() {
            return Err(FeedError::Closed);
        }
        let snapshot: Vec<Arc<dyn PriceListener>> = self.registry().clone();
        let mut first_error = None;
        for listener in &snapshot {
            if let Err(e) = listener.price_update(security, price) {
                warn!("Listener failed on {} @ {}: {:#}", security, price, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(source) => Err(FeedError::Listener {
                security: security.to_string(),
                price,
                source,
            }),
            None => Ok(snapshot.len()),
        }
    }

    /// Publishes a `PriceUpdate`.
    pub fn publish_update(&self, update: &PriceUpdate) -> Result<usize, FeedError> {
        self.publish(update.get_security(), update.get_price())
    }

    pub fn listener_count(&self) -> usize {
        self.registry().len()
    }

    /// Stops the source. Further publishes fail with `FeedError::Closed` and all
    /// listeners are dropped.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.registry().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl PriceSource for InMemoryPriceSource {
    fn add_price_listener(&self, listener: Arc<dyn PriceListener>) -> anyhow::Result<()> {
        if self.is_closed() {
            return Err(FeedError::Closed.into());
        }
        let mut listeners = self.registry();
        listeners.push(listener);
        debug!("Listener added ({} registered)", listeners.len());
        Ok(())
    }

    fn remove_price_listener(&self, listener: &dyn PriceListener) -> anyhow::Result<()> {
        let mut listeners = self.registry();
        listeners.retain(|l| !same_listener(l.as_ref(), listener));
        debug!("Listener removed ({} registered)", listeners.len());
        Ok(())
    }
}
