//! Execution backends for buy orders.
//!
//! Only a paper backend exists: it fills every accepted order immediately at the
//! order price and keeps a simple cash/position book.

pub mod paper;

pub use paper::{Fill, PaperError, PaperExecutionService};
