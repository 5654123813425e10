use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use trading::{BuyOrder, ExecutionService, Lots};
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaperError {
    #[error("Buy {security} x {lots} @ {price} rejected: cost {cost} exceeds cash {cash}")]
    Rejected {
        security: String,
        price: f64,
        lots: Lots,
        cost: f64,
        cash: f64,
    },
}

/// A filled paper order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub id: Uuid,
    pub order: BuyOrder,
    /// Cash left after the fill.
    pub cash_after: f64,
}

#[derive(Debug, Default)]
struct Book {
    cash: f64,
    positions: HashMap<String, Lots>,
    fills: Vec<Fill>,
}

/// Paper `ExecutionService`: fills at the order price, no slippage, no fees.
pub struct PaperExecutionService {
    book: Mutex<Book>,
    enforce_cash: bool,
}

impl PaperExecutionService {
    /// Creates a backend with `initial_cash`. Cash may go negative.
    pub fn new(initial_cash: f64) -> Self {
        Self {
            book: Mutex::new(Book {
                cash: initial_cash,
                ..Default::default()
            }),
            enforce_cash: false,
        }
    }

    /// Rejects orders whose notional exceeds the remaining cash.
    pub fn with_cash_check(mut self) -> Self {
        self.enforce_cash = true;
        self
    }

    fn book(&self) -> MutexGuard<'_, Book> {
        self.book
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn cash(&self) -> f64 {
        self.book().cash
    }

    pub fn position(&self, security: &str) -> Lots {
        self.book().positions.get(security).copied().unwrap_or(0)
    }

    pub fn fills(&self) -> Vec<Fill> {
        self.book().fills.clone()
    }
}

impl ExecutionService for PaperExecutionService {
    fn buy(&self, security: &str, price: f64, lots: Lots) -> anyhow::Result<()> {
        let order = BuyOrder::new(security, price, lots);
        let cost = order.notional();

        let mut book = self.book();
        if self.enforce_cash && cost > book.cash {
            let err = PaperError::Rejected {
                security: security.to_string(),
                price,
                lots,
                cost,
                cash: book.cash,
            };
            warn!("{}", err);
            return Err(err.into());
        }

        book.cash -= cost;
        *book.positions.entry(security.to_string()).or_insert(0) += lots;
        let fill = Fill {
            id: Uuid::new_v4(),
            order,
            cash_after: book.cash,
        };
        info!(
            "Paper fill {}: BUY {} x {} @ {} (cash {})",
            fill.id, security, lots, price, book.cash
        );
        book.fills.push(fill);
        Ok(())
    }
}
