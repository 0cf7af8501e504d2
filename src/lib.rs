//! Folio Core - Portfolio valuation and analytics engine.
//!
//! This crate turns a raw transaction ledger plus external daily price and
//! FX data into point-in-time holdings, multi-currency valuations, history
//! series and performance/risk statistics. It is storage- and
//! transport-agnostic: collaborators (transaction store, price source, FX
//! source, benchmark series) are defined as traits implemented elsewhere.

pub mod assets;
pub mod benchmarks;
pub mod constants;
pub mod errors;
pub mod fx;
pub mod market_data;
pub mod portfolio;
pub mod settings;
pub mod transactions;

// Re-export common types from the portfolio module
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
