use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ANALYTICS_CACHE_TTL_SECS, DEFAULT_FX_FALLBACK_DAYS, DEFAULT_PRICE_FALLBACK_DAYS,
    DEFAULT_RISK_FREE_RATE, DEFAULT_VAR_CONFIDENCE,
};

/// Tunable parameters for valuation and analytics.
///
/// Passed explicitly into each service rather than read from ambient global
/// state, so two callers can run with different policies concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationSettings {
    /// How many calendar days to search backward for a missing closing price.
    /// Absorbs weekends and market holidays.
    pub price_fallback_days: i64,
    /// How many calendar days to search backward for a missing FX rate.
    pub fx_fallback_days: i64,
    /// Annual risk-free rate (decimal fraction) used when the caller does
    /// not supply one.
    pub default_risk_free_rate: Decimal,
    /// Confidence level for historical Value-at-Risk, e.g. 0.95.
    pub var_confidence: Decimal,
    /// Time-to-live for cached analytics results.
    pub analytics_cache_ttl: Duration,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        ValuationSettings {
            price_fallback_days: DEFAULT_PRICE_FALLBACK_DAYS,
            fx_fallback_days: DEFAULT_FX_FALLBACK_DAYS,
            default_risk_free_rate: Decimal::from_str(DEFAULT_RISK_FREE_RATE)
                .unwrap_or(Decimal::ZERO),
            var_confidence: Decimal::from_str(DEFAULT_VAR_CONFIDENCE)
                .unwrap_or_else(|_| Decimal::new(95, 2)),
            analytics_cache_ttl: Duration::from_secs(DEFAULT_ANALYTICS_CACHE_TTL_SECS),
        }
    }
}
