use serde::{Deserialize, Serialize};

/// Order quantity. Signed so that whatever the caller configured is carried through unchanged.
pub type Lots = i64;

/// A buy instruction as handed to an `ExecutionService`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyOrder {
    /// Canonical (lowercase) security identifier.
    pub security: String,
    /// Execution price: the observed price that triggered the order.
    pub price: f64,
    /// Quantity to buy.
    pub lots: Lots,
}

impl BuyOrder {
    pub fn new(security: impl Into<String>, price: f64, lots: Lots) -> Self {
        Self {
            security: security.into(),
            price,
            lots,
        }
    }

    pub fn get_security(&self) -> &str {
        &self.security
    }

    pub fn get_price(&self) -> f64 {
        self.price
    }

    pub fn get_lots(&self) -> Lots {
        self.lots
    }

    /// Notional value of the order (`price * lots`).
    pub fn notional(&self) -> f64 {
        self.price * self.lots as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notional_uses_signed_lots() {
        assert_eq!(BuyOrder::new("ibm", 50.0, 5000).notional(), 250_000.0);
        assert_eq!(BuyOrder::new("ibm", 50.0, -2).notional(), -100.0);
    }
}
