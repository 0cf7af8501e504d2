//! Return calculations over a daily value series plus external flows.
//!
//! Everything here is a stateless function; the orchestrator owns data
//! fetching. Growth rates are computed in f64 (fractional exponents and
//! the XIRR solver have no exact decimal form) and rounded back into
//! `Decimal` at the engine precision.

use chrono::NaiveDate;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included};

use super::performance_model::{CashFlow, SeriesPoint};
use crate::constants::{
    DAYS_PER_YEAR, DECIMAL_PRECISION, XIRR_DERIVATIVE_FLOOR, XIRR_INITIAL_GUESS,
    XIRR_MAX_ITERATIONS, XIRR_TOLERANCE,
};

/// `(end - start) / start`. Absent for an empty or zero-based period.
pub fn simple_return(start: Decimal, end: Decimal) -> Option<Decimal> {
    if start.is_zero() {
        return None;
    }
    Some(((end - start) / start).round_dp(DECIMAL_PRECISION))
}

/// Daily returns by daily linking: `r = (V_end - flow) / V_start - 1`,
/// where `flow` is the net external cash flow since the previous
/// observation. Consecutive points can span a gap (an excluded or
/// unpriced day), so every flow dated inside `(prev, curr]` is stripped,
/// not just one keyed on the end day. Days starting from a zero value
/// yield no return observation.
pub fn daily_returns(
    series: &[SeriesPoint],
    flows_by_date: &BTreeMap<NaiveDate, Decimal>,
) -> Vec<(NaiveDate, Decimal)> {
    let mut returns = Vec::with_capacity(series.len().saturating_sub(1));
    for window in series.windows(2) {
        let (prev, curr) = (window[0], window[1]);
        if prev.value.is_zero() {
            continue;
        }
        let flow: Decimal = flows_by_date
            .range((Excluded(prev.date), Included(curr.date)))
            .map(|(_, amount)| *amount)
            .sum();
        let r = (curr.value - flow) / prev.value - Decimal::ONE;
        returns.push((curr.date, r));
    }
    returns
}

/// Time-weighted return: the product of daily growth factors minus one.
/// External flows carry no weight by construction, so a deposit-heavy
/// period does not masquerade as performance.
pub fn time_weighted_return(
    series: &[SeriesPoint],
    flows_by_date: &BTreeMap<NaiveDate, Decimal>,
) -> Option<Decimal> {
    if series.len() < 2 {
        return None;
    }
    let mut linked = Decimal::ONE;
    for (_, r) in daily_returns(series, flows_by_date) {
        linked *= Decimal::ONE + r;
    }
    Some((linked - Decimal::ONE).round_dp(DECIMAL_PRECISION))
}

/// CAGR: `(end / start)^(365 / days) - 1`. Absent for non-positive
/// endpoints or a zero-length period.
pub fn annualized_return(start: Decimal, end: Decimal, days: i64) -> Option<Decimal> {
    if days <= 0 || start <= Decimal::ZERO || end <= Decimal::ZERO {
        return None;
    }
    let ratio = (end / start).to_f64()?;
    let exponent = DAYS_PER_YEAR as f64 / days as f64;
    let annualized = ratio.powf(exponent) - 1.0;
    Decimal::from_f64(annualized).map(|d| d.round_dp(DECIMAL_PRECISION))
}

/// XIRR solver result. A failed solve is data, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct XirrOutcome {
    pub rate: Option<Decimal>,
    pub failure: Option<String>,
}

impl XirrOutcome {
    fn failed(reason: &str) -> Self {
        XirrOutcome {
            rate: None,
            failure: Some(reason.to_string()),
        }
    }
}

/// Money-weighted return: solves `sum(CF_i / (1+r)^(dt_i/365)) = 0` by
/// Newton-Raphson with a fixed initial guess and a hard iteration
/// ceiling. Flows are investor-signed: the opening value and deposits
/// negative, withdrawals and the closing value positive.
pub fn xirr(flows: &[CashFlow]) -> XirrOutcome {
    if flows.len() < 2 {
        return XirrOutcome::failed("Fewer than two cash flows");
    }
    let has_positive = flows.iter().any(|f| f.amount > Decimal::ZERO);
    let has_negative = flows.iter().any(|f| f.amount < Decimal::ZERO);
    if !has_positive || !has_negative {
        return XirrOutcome::failed("Cash flows are all one sign");
    }

    let origin = flows[0].date;
    let terms: Vec<(f64, f64)> = flows
        .iter()
        .filter_map(|f| {
            let years = (f.date - origin).num_days() as f64 / DAYS_PER_YEAR as f64;
            f.amount.to_f64().map(|amount| (amount, years))
        })
        .collect();
    if terms.len() != flows.len() {
        return XirrOutcome::failed("Cash flow outside representable range");
    }

    let mut rate = XIRR_INITIAL_GUESS;
    for _ in 0..XIRR_MAX_ITERATIONS {
        if rate <= -1.0 {
            return XirrOutcome::failed("Rate diverged below -100%");
        }

        let mut npv = 0.0;
        let mut derivative = 0.0;
        for &(amount, years) in &terms {
            let discount = (1.0 + rate).powf(years);
            npv += amount / discount;
            derivative -= years * amount / ((1.0 + rate) * discount);
        }

        if npv.abs() < XIRR_TOLERANCE {
            return match Decimal::from_f64(rate) {
                Some(d) => XirrOutcome {
                    rate: Some(d.round_dp(DECIMAL_PRECISION)),
                    failure: None,
                },
                None => XirrOutcome::failed("Converged rate not representable"),
            };
        }
        if derivative.abs() < XIRR_DERIVATIVE_FLOOR {
            return XirrOutcome::failed("Derivative vanished before convergence");
        }

        rate -= npv / derivative;
        if !rate.is_finite() {
            return XirrOutcome::failed("Iteration produced a non-finite rate");
        }
    }
    XirrOutcome::failed("Did not converge within the iteration ceiling")
}
