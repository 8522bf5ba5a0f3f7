pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use adapters::HttpUpstream;
pub use config::toml_config::AggregatorConfig;
pub use core::aggregator::Aggregator;
pub use core::catalog::CatalogFilter;
pub use core::valuation::{FruitValuator, PriceQuote, ValuationInput, ValuationRequest};
pub use utils::error::{AggregatorError, Result};
