//! Relative statistics against a reference index.
//!
//! Every statistic runs over date-aligned pairs of daily returns; a date
//! present in only one series is dropped before computation, so holiday
//! mismatches between venues never skew the covariance.

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};

use super::performance_model::BenchmarkComparison;
use crate::constants::{DECIMAL_PRECISION, TRADING_DAYS_PER_YEAR};

/// Minimum aligned observations for a meaningful covariance.
const MIN_ALIGNED_POINTS: usize = 2;

/// Intersects two dated return series. Both inputs are ascending by date.
pub fn align_returns(
    portfolio: &[(NaiveDate, Decimal)],
    benchmark: &[(NaiveDate, Decimal)],
) -> Vec<(Decimal, Decimal)> {
    let mut pairs = Vec::with_capacity(portfolio.len().min(benchmark.len()));
    let mut b = benchmark.iter().peekable();
    for (date, rp) in portfolio {
        while b.peek().is_some_and(|(bd, _)| bd < date) {
            b.next();
        }
        if let Some((bd, rm)) = b.peek() {
            if bd == date {
                pairs.push((*rp, *rm));
                b.next();
            }
        }
    }
    pairs
}

fn mean(values: impl Iterator<Item = Decimal>, n: usize) -> Decimal {
    values.sum::<Decimal>() / Decimal::from(n)
}

/// Computes beta, alpha, correlation, tracking error and information
/// ratio from aligned pairs. Too few pairs yields absent fields plus a
/// warning rather than an error.
pub fn compare_to_benchmark(
    benchmark_id: &str,
    portfolio: &[(NaiveDate, Decimal)],
    benchmark: &[(NaiveDate, Decimal)],
    risk_free_annual: Decimal,
) -> BenchmarkComparison {
    let pairs = align_returns(portfolio, benchmark);
    let n = pairs.len();

    let mut comparison = BenchmarkComparison {
        benchmark_id: benchmark_id.to_string(),
        aligned_points: n,
        beta: None,
        alpha: None,
        correlation: None,
        tracking_error: None,
        information_ratio: None,
        warnings: Vec::new(),
    };
    if n < MIN_ALIGNED_POINTS {
        comparison.warnings.push(format!(
            "Only {} aligned return days with {}; statistics need at least {}",
            n, benchmark_id, MIN_ALIGNED_POINTS
        ));
        return comparison;
    }

    let mean_p = mean(pairs.iter().map(|(p, _)| *p), n);
    let mean_m = mean(pairs.iter().map(|(_, m)| *m), n);

    let divisor = Decimal::from(n - 1);
    let covariance: Decimal = pairs
        .iter()
        .map(|(p, m)| (*p - mean_p) * (*m - mean_m))
        .sum::<Decimal>()
        / divisor;
    let var_p: Decimal = pairs
        .iter()
        .map(|(p, _)| (*p - mean_p) * (*p - mean_p))
        .sum::<Decimal>()
        / divisor;
    let var_m: Decimal = pairs
        .iter()
        .map(|(_, m)| (*m - mean_m) * (*m - mean_m))
        .sum::<Decimal>()
        / divisor;

    let trading_days = Decimal::from(TRADING_DAYS_PER_YEAR);

    if !var_m.is_zero() {
        let beta = covariance / var_m;
        comparison.beta = Some(beta.round_dp(DECIMAL_PRECISION));

        // Jensen's alpha on annualized mean returns.
        let annual_p = mean_p * trading_days;
        let annual_m = mean_m * trading_days;
        let alpha = annual_p - (risk_free_annual + beta * (annual_m - risk_free_annual));
        comparison.alpha = Some(alpha.round_dp(DECIMAL_PRECISION));
    } else {
        comparison
            .warnings
            .push(format!("{} returns have zero variance", benchmark_id));
    }

    if let (Some(sd_p), Some(sd_m)) = (var_p.sqrt(), var_m.sqrt()) {
        if !sd_p.is_zero() && !sd_m.is_zero() {
            comparison.correlation =
                Some((covariance / (sd_p * sd_m)).round_dp(DECIMAL_PRECISION));
        }
    }

    let diffs: Vec<Decimal> = pairs.iter().map(|(p, m)| *p - *m).collect();
    let mean_diff = mean(diffs.iter().copied(), n);
    let var_diff: Decimal = diffs
        .iter()
        .map(|d| (*d - mean_diff) * (*d - mean_diff))
        .sum::<Decimal>()
        / divisor;
    if let Some(tracking_error) = var_diff.sqrt() {
        comparison.tracking_error = Some(tracking_error.round_dp(DECIMAL_PRECISION));
        if !tracking_error.is_zero() {
            comparison.information_ratio =
                Some((mean_diff / tracking_error).round_dp(DECIMAL_PRECISION));
        }
    }

    comparison
}
