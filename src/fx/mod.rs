//! FX (Foreign Exchange) module - domain models, lookup table, and traits.

mod fx_errors;
mod fx_model;
mod fx_table;
mod fx_traits;

pub use fx_errors::FxError;
pub use fx_model::{convert_with_broker_rate, FxRatePoint};
pub use fx_table::FxRateTable;
pub use fx_traits::FxSourceTrait;

#[cfg(test)]
mod fx_table_tests;
