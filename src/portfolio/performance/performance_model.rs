//! Analytics domain models.
//!
//! All rates are decimal fractions (0.05 = 5%), rounded to the engine
//! precision. Statistics that cannot be computed from the data at hand
//! are absent, never zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One day of the portfolio value series handed to the calculators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        SeriesPoint { date, value }
    }
}

/// An external cash movement, signed from the portfolio's perspective:
/// deposits positive, withdrawals negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// Return figures over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub start_value: Option<Decimal>,
    pub end_value: Option<Decimal>,
    pub simple_return: Option<Decimal>,
    /// Daily-linked time-weighted return; external flows carry no weight.
    pub time_weighted_return: Option<Decimal>,
    pub annualized_return: Option<Decimal>,
    /// Money-weighted return (XIRR). Absent when the solver does not
    /// converge; `money_weighted_failure` then says why.
    pub money_weighted_return: Option<Decimal>,
    pub money_weighted_failure: Option<String>,
}

/// One peak-to-trough episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownPeriod {
    pub peak_date: NaiveDate,
    pub trough_date: NaiveDate,
    /// Positive fraction: (peak - trough) / peak.
    pub depth: Decimal,
    /// First date the running peak was regained; None while ongoing.
    pub recovery_date: Option<NaiveDate>,
}

/// Dispersion and tail statistics over the daily return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    /// Annualized standard deviation of daily returns.
    pub volatility: Option<Decimal>,
    pub sharpe_ratio: Option<Decimal>,
    pub sortino_ratio: Option<Decimal>,
    /// Deepest drawdown fraction across the series.
    pub max_drawdown: Option<Decimal>,
    /// Largest drawdown episodes, deepest first.
    pub drawdown_periods: Vec<DrawdownPeriod>,
    /// Historical one-day loss at the configured confidence, as a
    /// positive fraction.
    pub value_at_risk: Option<Decimal>,
    pub var_confidence: Decimal,
}

/// Relative statistics against a reference index over date-aligned
/// daily returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub benchmark_id: String,
    /// Days present in both return series after alignment.
    pub aligned_points: usize,
    pub beta: Option<Decimal>,
    /// Jensen's alpha, annualized.
    pub alpha: Option<Decimal>,
    pub correlation: Option<Decimal>,
    pub tracking_error: Option<Decimal>,
    pub information_ratio: Option<Decimal>,
    pub warnings: Vec<String>,
}

/// Combined analytics for one portfolio and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub portfolio_id: String,
    pub currency: String,
    pub performance: PerformanceSummary,
    pub risk: RiskMetrics,
    pub benchmark: Option<BenchmarkComparison>,
    pub warnings: Vec<String>,
}
