//! Portfolio domain: holdings aggregation, valuation, history generation
//! and performance analytics.

pub mod history;
pub mod holdings;
pub mod performance;
pub mod valuation;

pub mod portfolio_model;
pub mod portfolio_traits;

pub use portfolio_model::*;
pub use portfolio_traits::*;
