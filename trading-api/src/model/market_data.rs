//! Market Data models.
//!
//! A `PriceUpdate` is one observation of a security's traded price as pushed by a feed.

use serde::{Deserialize, Serialize};

/// Represents a single price observation for a security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// The security identifier as published by the feed (case is not normalized).
    pub security: String,
    /// The observed price.
    pub price: f64,
    /// The timestamp of the observation (unix millis).
    pub timestamp: u64,
}

impl PriceUpdate {
    /// Creates a new PriceUpdate.
    pub fn new(security: impl Into<String>, price: f64, timestamp: u64) -> Self {
        Self {
            security: security.into(),
            price,
            timestamp,
        }
    }

    pub fn get_security(&self) -> &str {
        &self.security
    }

    pub fn get_price(&self) -> f64 {
        self.price
    }

    pub fn get_timestamp(&self) -> u64 {
        self.timestamp
    }
}
