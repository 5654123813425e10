pub mod executor;
pub mod price_source;
