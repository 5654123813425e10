//! Recording test doubles for the collaborator contracts.
//!
//! Compiled for this crate's own tests and for any crate enabling the
//! `test-utils` feature.

use crate::model::order::{BuyOrder, Lots};
use crate::traits::executor::ExecutionService;
use crate::traits::price_source::{PriceListener, PriceSource, same_listener};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Error returned by a double that has been armed to fail.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("injected failure: {0}")]
pub struct InjectedFailure(pub String);

type BuyHook = Arc<dyn Fn(&BuyOrder) + Send + Sync>;
type RemoveHook = Arc<dyn Fn(&dyn PriceListener) + Send + Sync>;

/// An `ExecutionService` that records every buy it receives.
#[derive(Default)]
pub struct RecordingExecutionService {
    calls: Mutex<Vec<BuyOrder>>,
    failure: Mutex<Option<String>>,
    hook: Mutex<Option<BuyHook>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingExecutionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `buy` fail after being recorded.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(message.into());
    }

    /// Runs `hook` inside every `buy`, after the call is recorded.
    pub fn on_buy(&self, hook: impl Fn(&BuyOrder) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Arc::new(hook));
    }

    /// Sleeps inside every `buy` to widen race windows.
    pub fn with_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<BuyOrder> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of recorded calls with exactly these arguments.
    pub fn times_called_with(&self, security: &str, price: f64, lots: Lots) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.security == security && o.price == price && o.lots == lots)
            .count()
    }
}

impl ExecutionService for RecordingExecutionService {
    fn buy(&self, security: &str, price: f64, lots: Lots) -> anyhow::Result<()> {
        let order = BuyOrder::new(security, price, lots);
        self.calls.lock().unwrap().push(order.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let hook = self.hook.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(&order);
        }

        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(InjectedFailure(message).into()),
            None => Ok(()),
        }
    }
}

/// A `PriceSource` that counts registrations and can publish to its listeners.
#[derive(Default)]
pub struct RecordingPriceSource {
    listeners: Mutex<Vec<Arc<dyn PriceListener>>>,
    add_calls: AtomicUsize,
    remove_calls: AtomicUsize,
    fail_add: AtomicBool,
    fail_remove: AtomicBool,
    remove_hook: Mutex<Option<RemoveHook>>,
}

impl RecordingPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_count(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn remove_count(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn fail_on_add(&self, fail: bool) {
        self.fail_add.store(fail, Ordering::SeqCst);
    }

    pub fn fail_on_remove(&self, fail: bool) {
        self.fail_remove.store(fail, Ordering::SeqCst);
    }

    /// Runs `hook` inside every `remove_price_listener`, with the listener being
    /// removed, before it leaves the registry.
    pub fn on_remove(&self, hook: impl Fn(&dyn PriceListener) + Send + Sync + 'static) {
        *self.remove_hook.lock().unwrap() = Some(Arc::new(hook));
    }

    /// Delivers a price to every registered listener, outside the registry lock.
    pub fn publish(&self, security: &str, price: f64) -> anyhow::Result<()> {
        let snapshot: Vec<Arc<dyn PriceListener>> = self.listeners.lock().unwrap().clone();
        for listener in snapshot {
            listener.price_update(security, price)?;
        }
        Ok(())
    }
}

impl PriceSource for RecordingPriceSource {
    fn add_price_listener(&self, listener: Arc<dyn PriceListener>) -> anyhow::Result<()> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(InjectedFailure("add_price_listener".into()).into());
        }
        self.listeners.lock().unwrap().push(listener);
        Ok(())
    }

    fn remove_price_listener(&self, listener: &dyn PriceListener) -> anyhow::Result<()> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(InjectedFailure("remove_price_listener".into()).into());
        }
        let hook = self.remove_hook.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(listener);
        }
        self.listeners
            .lock()
            .unwrap()
            .retain(|l| !same_listener(l.as_ref(), listener));
        Ok(())
    }
}
