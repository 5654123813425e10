//! A dummy implementation of a price feed.
//!
//! - `source`: `InMemoryPriceSource`, a listener registry that fans prices out
//!   to subscribers.
//! - `random_walk`: `RandomWalk`, a seeded synthetic price generator.

pub mod random_walk;
pub mod source;

pub use random_walk::RandomWalk;
pub use source::{FeedError, InMemoryPriceSource};
