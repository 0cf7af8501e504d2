//! Market data module - price models, lookup table, and traits.

mod market_data_errors;
mod market_data_model;
mod market_data_traits;
mod price_table;

pub use market_data_errors::MarketDataError;
pub use market_data_model::{PriceLookup, PricePoint};
pub use market_data_traits::PriceSourceTrait;
pub use price_table::PriceTable;
