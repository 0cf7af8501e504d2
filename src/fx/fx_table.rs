//! In-memory FX rate lookup built from a batched fetch.
//!
//! The history engine fetches all rates for a range once and resolves every
//! per-date conversion against this table, so no conversion inside the
//! rolling pass issues a query.

use chrono::{Duration, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::fx_errors::FxError;
use super::fx_model::FxRatePoint;

/// Per-pair daily rate series with bounded nearest-earlier fallback.
///
/// Inverse pairs are materialized at insertion, so a lookup for EUR->USD is
/// satisfied by a stored USD->EUR observation and vice versa.
#[derive(Debug, Default, Clone)]
pub struct FxRateTable {
    rates: HashMap<(String, String), BTreeMap<NaiveDate, Decimal>>,
}

impl FxRateTable {
    pub fn new(points: Vec<FxRatePoint>) -> Self {
        let mut table = FxRateTable {
            rates: HashMap::new(),
        };
        table.add_points(points);
        table
    }

    pub fn add_points(&mut self, points: Vec<FxRatePoint>) {
        for point in points {
            if point.base_currency == point.quote_currency || point.rate.is_zero() {
                continue;
            }

            let forward = (point.base_currency.clone(), point.quote_currency.clone());
            let inverse = (point.quote_currency.clone(), point.base_currency.clone());

            self.rates
                .entry(forward)
                .or_default()
                .insert(point.date, point.rate);
            self.rates
                .entry(inverse)
                .or_default()
                .insert(point.date, Decimal::ONE / point.rate);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Rate converting one unit of `from` into `to` on `date`, falling back
    /// to the nearest earlier observation within `window_days`.
    pub fn get_rate(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
        window_days: i64,
    ) -> Result<Decimal, FxError> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        let pair = (from.to_string(), to.to_string());
        let series = self.rates.get(&pair).ok_or_else(|| {
            FxError::RateNotFound(format!("{}->{} (no observations fetched)", from, to))
        })?;

        let earliest = date - Duration::days(window_days);
        match series.range(earliest..=date).next_back() {
            Some((actual_date, rate)) => {
                if *actual_date != date {
                    debug!(
                        "FX {}->{} on {}: using nearest earlier observation from {}",
                        from, to, date, actual_date
                    );
                }
                Ok(*rate)
            }
            None => Err(FxError::RateNotFound(format!(
                "{}->{} on {} (searched back {} days)",
                from, to, date, window_days
            ))),
        }
    }

    /// Converts `amount` from one currency to another on `date`.
    pub fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
        date: NaiveDate,
        window_days: i64,
    ) -> Result<Decimal, FxError> {
        let rate = self.get_rate(from, to, date, window_days)?;
        Ok(amount * rate)
    }
}
