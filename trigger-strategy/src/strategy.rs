//! The buy-once price trigger.
//!
//! `connect`, `disconnect` and price delivery all run under one per-instance
//! lock. The lock is reentrant so an execution service that publishes back into
//! the feed on the same thread sees the strategy as already fired instead of
//! deadlocking.

use crate::config::{Equivalence, StrategyConfig};
use crate::error::{Result, StrategyError};
use log::{debug, info};
use parking_lot::ReentrantMutex;
use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use trading::{ExecutionService, Lots, PriceListener, PriceSource};

/// Where a strategy is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not subscribed. Initial state, and the state after an explicit disconnect.
    Idle,
    /// Subscribed and eligible to fire.
    Connected,
    /// Has fired. Terminal.
    Fired,
}

/// Owned form of the fields that define a strategy's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StrategyKey {
    pub security: String,
    pub threshold_bits: u64,
    pub lots: Option<Lots>,
}

/// Submits one buy order the first time a security trades strictly below a threshold.
pub struct TradingStrategy {
    target_security: String,
    /// `target_security` folded per char, compared against incoming ids.
    match_key: String,
    threshold_price: f64,
    lots: Lots,
    equivalence: Equivalence,
    execution_service: Arc<dyn ExecutionService>,
    price_source: Arc<dyn PriceSource>,
    lifecycle: ReentrantMutex<Cell<Lifecycle>>,
}

impl TradingStrategy {
    /// Creates an idle strategy. Does not subscribe.
    ///
    /// Values are taken as given: zero or negative lots and non-finite
    /// thresholds are not rejected. Use [`TradingStrategy::try_new`] to validate.
    pub fn new(
        config: StrategyConfig,
        execution_service: Arc<dyn ExecutionService>,
        price_source: Arc<dyn PriceSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            target_security: config.security().to_lowercase(),
            match_key: fold_case(config.security()).collect(),
            threshold_price: config.threshold(),
            lots: config.lots(),
            equivalence: config.equivalence(),
            execution_service,
            price_source,
            lifecycle: ReentrantMutex::new(Cell::new(Lifecycle::Idle)),
        })
    }

    /// Like [`TradingStrategy::new`], but fails with
    /// [`StrategyError::InvalidConfiguration`] on a config `validate` rejects.
    pub fn try_new(
        config: StrategyConfig,
        execution_service: Arc<dyn ExecutionService>,
        price_source: Arc<dyn PriceSource>,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        Ok(Self::new(config, execution_service, price_source))
    }

    /// Subscribes to the price source unless already connected.
    ///
    /// A fired strategy stays fired; connecting it again is a no-op. If the
    /// source fails to register the listener the strategy stays idle.
    pub fn connect(self: &Arc<Self>) -> Result<()> {
        let lifecycle = self.lifecycle.lock();
        match lifecycle.get() {
            Lifecycle::Connected => {
                debug!("{} already connected", self);
                Ok(())
            }
            Lifecycle::Fired => {
                debug!("{} has already fired, not reconnecting", self);
                Ok(())
            }
            Lifecycle::Idle => {
                let listener: Arc<dyn PriceListener> = self.clone();
                self.price_source
                    .add_price_listener(listener)
                    .map_err(StrategyError::feed)?;
                lifecycle.set(Lifecycle::Connected);
                info!("{} connected", self);
                Ok(())
            }
        }
    }

    /// Marks the strategy disconnected, then deregisters it from the price source.
    ///
    /// Always issues the deregistration call, even when already disconnected.
    pub fn disconnect(&self) -> Result<()> {
        let lifecycle = self.lifecycle.lock();
        if lifecycle.get() == Lifecycle::Connected {
            lifecycle.set(Lifecycle::Idle);
            info!("{} disconnected", self);
        }
        self.detach()
    }

    /// Evaluates one price observation.
    ///
    /// Fires when connected, the security matches case-insensitively and
    /// `price < threshold`. Firing flips the lifecycle to `Fired` and
    /// deregisters before calling the execution service with the observed price.
    pub fn on_price(&self, security: &str, price: f64) -> Result<()> {
        let lifecycle = self.lifecycle.lock();
        if lifecycle.get() != Lifecycle::Connected {
            return Ok(());
        }
        if !self.matches_security(security) {
            return Ok(());
        }
        // NaN compares false and never fires.
        let below = price < self.threshold_price;
        if !below {
            debug!("{} ignoring {} at {}", self, security, price);
            return Ok(());
        }

        lifecycle.set(Lifecycle::Fired);
        info!("{} triggered at {}, buying {} lots", self, price, self.lots);
        self.detach()?;
        self.execution_service
            .buy(&self.target_security, price, self.lots)
            .map_err(StrategyError::execution)
    }

    fn detach(&self) -> Result<()> {
        self.price_source
            .remove_price_listener(self)
            .map_err(StrategyError::feed)
    }

    fn matches_security(&self, security: &str) -> bool {
        fold_case(security).eq(self.match_key.chars())
    }

    pub fn target_security(&self) -> &str {
        &self.target_security
    }

    pub fn threshold_price(&self) -> f64 {
        self.threshold_price
    }

    pub fn lots(&self) -> Lots {
        self.lots
    }

    pub fn equivalence(&self) -> Equivalence {
        self.equivalence
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.lock().get()
    }

    pub fn is_connected(&self) -> bool {
        self.lifecycle() == Lifecycle::Connected
    }

    pub fn has_fired(&self) -> bool {
        self.lifecycle() == Lifecycle::Fired
    }

    /// The identity used by `PartialEq` and `Hash`, per the configured `Equivalence`.
    pub fn key(&self) -> StrategyKey {
        let (security, threshold_bits, lots) = self.key_parts();
        StrategyKey {
            security: security.to_string(),
            threshold_bits,
            lots,
        }
    }

    fn key_parts(&self) -> (&str, u64, Option<Lots>) {
        // All NaNs are one value; 0.0 and -0.0 stay distinct.
        let threshold_bits = if self.threshold_price.is_nan() {
            f64::NAN.to_bits()
        } else {
            self.threshold_price.to_bits()
        };
        let lots = match self.equivalence {
            Equivalence::SecurityAndThreshold => None,
            Equivalence::SecurityThresholdAndLots => Some(self.lots),
        };
        (&self.target_security, threshold_bits, lots)
    }
}

/// Context-free case folding: upper-case each char, then lower-case the result.
///
/// `str::to_lowercase` is context sensitive (a word-final `Σ` becomes `ς`), so
/// both sides of a comparison must go through this instead.
fn fold_case(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars()
        .flat_map(char::to_uppercase)
        .flat_map(char::to_lowercase)
}

impl PriceListener for TradingStrategy {
    fn price_update(&self, security: &str, price: f64) -> anyhow::Result<()> {
        self.on_price(security, price)?;
        Ok(())
    }
}

impl PartialEq for TradingStrategy {
    fn eq(&self, other: &Self) -> bool {
        self.key_parts() == other.key_parts()
    }
}

impl Eq for TradingStrategy {}

impl Hash for TradingStrategy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_parts().hash(state);
    }
}

impl fmt::Display for TradingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Strategy[{} < {}]", self.target_security, self.threshold_price)
    }
}

impl fmt::Debug for TradingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradingStrategy")
            .field("target_security", &self.target_security)
            .field("threshold_price", &self.threshold_price)
            .field("lots", &self.lots)
            .field("equivalence", &self.equivalence)
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}
