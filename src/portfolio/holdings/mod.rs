//! Holdings module - position and cash aggregation from the ledger.

pub mod holdings_calculator;
mod holdings_model;
mod positions_model;

pub use holdings_calculator::*;
pub use holdings_model::*;
pub use positions_model::*;
