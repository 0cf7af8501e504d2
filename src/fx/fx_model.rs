//! FX domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One observed exchange rate, under the FX-service convention
/// **1 unit of `base` = `rate` x units of `quote`**.
///
/// This is the inverse of the broker-supplied rate carried on a
/// `Transaction` (1 portfolio-currency unit = broker rate x trade-currency
/// units); the two must never be substituted for each other. For the same
/// pair and date, `rate ~= 1 / broker_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxRatePoint {
    pub base_currency: String,
    pub quote_currency: String,
    pub date: NaiveDate,
    pub rate: Decimal,
}

impl FxRatePoint {
    pub fn new(base: &str, quote: &str, date: NaiveDate, rate: Decimal) -> Self {
        FxRatePoint {
            base_currency: base.to_string(),
            quote_currency: quote.to_string(),
            date,
            rate,
        }
    }

    /// Pair key used by lookup tables.
    pub fn pair(&self) -> (String, String) {
        (self.base_currency.clone(), self.quote_currency.clone())
    }
}

/// Converts a trade-currency amount to portfolio currency using the
/// broker-supplied rate from the transaction itself. Under the broker
/// convention the portfolio amount is `amount / rate`.
///
/// Returns `None` when the rate is absent or zero; the caller decides the
/// degradation policy.
pub fn convert_with_broker_rate(amount: Decimal, broker_rate: Option<Decimal>) -> Option<Decimal> {
    match broker_rate {
        Some(rate) if !rate.is_zero() => Some(amount / rate),
        _ => None,
    }
}
