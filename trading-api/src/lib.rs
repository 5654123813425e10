//! # Trading API
//!
//! Contracts shared by price-trigger strategies and the adapters they run against.
//!
//! ## Modules
//! - `model`: Plain data carried across the seams (`PriceUpdate`, `BuyOrder`).
//! - `traits`: The collaborator interfaces (`PriceListener`, `PriceSource`, `ExecutionService`).
//! - `testing`: Recording test doubles, behind the `test-utils` feature.

pub mod model;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use model::market_data::PriceUpdate;
pub use model::order::{BuyOrder, Lots};
pub use traits::executor::ExecutionService;
pub use traits::price_source::{PriceListener, PriceSource, same_listener};

