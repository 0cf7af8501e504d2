//! Benchmark series boundary - a reference index's daily value series,
//! synced by an external collaborator.

mod benchmarks_model;
mod benchmarks_traits;

pub use benchmarks_model::BenchmarkValue;
pub use benchmarks_traits::BenchmarkSeriesTrait;
