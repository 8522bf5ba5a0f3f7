pub mod aggregator;
pub mod cache;
pub mod catalog;
pub mod extractor;
pub mod stock;
pub mod valuation;

pub use crate::domain::model::{CatalogItem, StockEntry, StockResponse};
pub use crate::domain::ports::{DataSource, Upstream};
pub use crate::utils::error::Result;
