//! Performance module - returns, risk and benchmark analytics.

pub mod benchmark_calculator;
mod performance_model;
mod performance_service;
pub mod returns_calculator;
pub mod risk_calculator;

pub use performance_model::*;
pub use performance_service::*;

#[cfg(test)]
mod risk_calculator_tests;
#[cfg(test)]
mod benchmark_calculator_tests;
#[cfg(test)]
mod performance_service_tests;
