//! Defines the `PriceSource` / `PriceListener` pair for market data subscription.
//!
//! A `PriceSource` abstracts over how prices actually arrive (polling, sockets,
//! replay, synthetic generators). Strategies only see the push callback on
//! `PriceListener` and the register/deregister calls on `PriceSource`.

use std::sync::Arc;

/// Receives price observations pushed by a `PriceSource`.
///
/// Implementors must tolerate concurrent calls from several threads: a source
/// gives no single-threaded delivery guarantee and no ordering guarantee across
/// securities.
pub trait PriceListener: Send + Sync {
    /// Called for every observed price.
    ///
    /// # Arguments
    ///
    /// * `security` - The security identifier as published by the source.
    /// * `price` - The observed price.
    ///
    /// # Returns
    ///
    /// * `Err` if handling the observation failed; the source decides what to do with it.
    fn price_update(&self, security: &str, price: f64) -> anyhow::Result<()>;
}

/// A subscription point for price observations.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use trading::traits::price_source::{same_listener, PriceListener, PriceSource};
///
/// #[derive(Default)]
/// struct SingleSlot(Mutex<Option<Arc<dyn PriceListener>>>);
///
/// impl PriceSource for SingleSlot {
///     fn add_price_listener(&self, listener: Arc<dyn PriceListener>) -> anyhow::Result<()> {
///         *self.0.lock().unwrap() = Some(listener);
///         Ok(())
///     }
///
///     fn remove_price_listener(&self, listener: &dyn PriceListener) -> anyhow::Result<()> {
///         let mut slot = self.0.lock().unwrap();
///         if slot.as_deref().is_some_and(|l| same_listener(l, listener)) {
///             *slot = None;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PriceSource: Send + Sync {
    /// Registers a listener.
    ///
    /// Sources are not required to deduplicate: registering the same listener
    /// twice may deliver every price twice. Deduplication is the caller's job.
    fn add_price_listener(&self, listener: Arc<dyn PriceListener>) -> anyhow::Result<()>;

    /// Deregisters a listener.
    ///
    /// Must be safe to call for a listener that was never added or is already
    /// removed. Listener identity is the object address (see [`same_listener`]).
    ///
    /// Sources must not hold an internal lock while delivering prices, as
    /// listeners are allowed to deregister from inside `price_update`.
    fn remove_price_listener(&self, listener: &dyn PriceListener) -> anyhow::Result<()>;
}

/// Address identity for listeners, ignoring vtable metadata.
pub fn same_listener(a: &dyn PriceListener, b: &dyn PriceListener) -> bool {
    std::ptr::eq(
        a as *const dyn PriceListener as *const (),
        b as *const dyn PriceListener as *const (),
    )
}

impl<T: PriceSource + ?Sized> PriceSource for Arc<T> {
    fn add_price_listener(&self, listener: Arc<dyn PriceListener>) -> anyhow::Result<()> {
        (**self).add_price_listener(listener)
    }

    fn remove_price_listener(&self, listener: &dyn PriceListener) -> anyhow::Result<()> {
        (**self).remove_price_listener(listener)
    }
}
