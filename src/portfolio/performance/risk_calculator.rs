//! Dispersion, drawdown and tail statistics over the daily return series.

use chrono::NaiveDate;
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use std::collections::BTreeMap;

use super::performance_model::{DrawdownPeriod, RiskMetrics, SeriesPoint};
use super::returns_calculator::daily_returns;
use crate::constants::{DECIMAL_PRECISION, MAX_DRAWDOWN_PERIODS, TRADING_DAYS_PER_YEAR};

fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len()))
}

/// Sample standard deviation; needs at least two observations.
fn std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: Decimal = values.iter().map(|v| (*v - m) * (*v - m)).sum();
    let variance = sum_sq / Decimal::from(values.len() - 1);
    variance.sqrt()
}

fn annualization_factor() -> Option<Decimal> {
    Decimal::from(TRADING_DAYS_PER_YEAR).sqrt()
}

/// `stdev(daily returns) x sqrt(252)`.
pub fn annualized_volatility(daily: &[Decimal]) -> Option<Decimal> {
    let sd = std_dev(daily)?;
    Some((sd * annualization_factor()?).round_dp(DECIMAL_PRECISION))
}

/// `(mean daily excess return / stdev) x sqrt(252)`, with the annual
/// risk-free rate de-annualized to a daily figure.
pub fn sharpe_ratio(daily: &[Decimal], risk_free_annual: Decimal) -> Option<Decimal> {
    let sd = std_dev(daily)?;
    if sd.is_zero() {
        return None;
    }
    let excess = mean(daily)? - risk_free_annual / Decimal::from(TRADING_DAYS_PER_YEAR);
    Some((excess / sd * annualization_factor()?).round_dp(DECIMAL_PRECISION))
}

/// Sharpe with the denominator replaced by the standard deviation of
/// negative-return days only. Absent when there are too few losing days
/// to measure downside dispersion.
pub fn sortino_ratio(daily: &[Decimal], risk_free_annual: Decimal) -> Option<Decimal> {
    let downside: Vec<Decimal> = daily.iter().copied().filter(|r| *r < Decimal::ZERO).collect();
    let sd = std_dev(&downside)?;
    if sd.is_zero() {
        return None;
    }
    let excess = mean(daily)? - risk_free_annual / Decimal::from(TRADING_DAYS_PER_YEAR);
    Some((excess / sd * annualization_factor()?).round_dp(DECIMAL_PRECISION))
}

/// Peak-to-trough episodes against the running peak, deepest first,
/// capped at the retention limit. The final episode has no recovery date
/// when the series ends below its peak.
pub fn drawdown_periods(series: &[SeriesPoint]) -> Vec<DrawdownPeriod> {
    let mut periods: Vec<DrawdownPeriod> = Vec::new();
    let Some(first) = series.first() else {
        return periods;
    };

    let mut peak = *first;
    let mut trough: Option<SeriesPoint> = None;

    for point in &series[1..] {
        if point.value >= peak.value {
            if let Some(t) = trough.take() {
                periods.push(make_period(peak, t, Some(point.date)));
            }
            peak = *point;
        } else if trough.map_or(true, |t| point.value < t.value) {
            trough = Some(*point);
        }
    }
    if let Some(t) = trough {
        periods.push(make_period(peak, t, None));
    }

    periods.retain(|p| p.depth > Decimal::ZERO);
    periods.sort_by(|a, b| b.depth.cmp(&a.depth));
    periods.truncate(MAX_DRAWDOWN_PERIODS);
    periods
}

fn make_period(peak: SeriesPoint, trough: SeriesPoint, recovery: Option<NaiveDate>) -> DrawdownPeriod {
    let depth = if peak.value.is_zero() {
        Decimal::ZERO
    } else {
        ((peak.value - trough.value) / peak.value).round_dp(DECIMAL_PRECISION)
    };
    DrawdownPeriod {
        peak_date: peak.date,
        trough_date: trough.date,
        depth,
        recovery_date: recovery,
    }
}

/// Historical one-day Value-at-Risk: the (1 - confidence) empirical
/// quantile of the daily return distribution, reported as a positive
/// loss fraction (floored at zero when the quantile is a gain).
pub fn value_at_risk(daily: &[Decimal], confidence: Decimal) -> Option<Decimal> {
    if daily.is_empty() {
        return None;
    }
    let mut sorted = daily.to_vec();
    sorted.sort();
    let tail = (Decimal::ONE - confidence) * Decimal::from(sorted.len());
    let index = tail.floor().to_usize()?;
    let quantile = sorted[index.min(sorted.len() - 1)];
    Some((-quantile).max(Decimal::ZERO).round_dp(DECIMAL_PRECISION))
}

/// Assembles the full risk block for one portfolio series.
pub fn calculate_risk(
    series: &[SeriesPoint],
    flows_by_date: &BTreeMap<NaiveDate, Decimal>,
    risk_free_annual: Decimal,
    var_confidence: Decimal,
) -> RiskMetrics {
    let daily: Vec<Decimal> = daily_returns(series, flows_by_date)
        .into_iter()
        .map(|(_, r)| r)
        .collect();
    let periods = drawdown_periods(series);

    RiskMetrics {
        volatility: annualized_volatility(&daily),
        sharpe_ratio: sharpe_ratio(&daily, risk_free_annual),
        sortino_ratio: sortino_ratio(&daily, risk_free_annual),
        max_drawdown: periods.first().map(|p| p.depth),
        drawdown_periods: periods,
        value_at_risk: value_at_risk(&daily, var_confidence),
        var_confidence,
    }
}
