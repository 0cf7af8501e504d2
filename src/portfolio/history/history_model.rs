//! History domain models and target-date generation.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::errors::ValidationError;
use crate::portfolio::valuation::ValuationSnapshot;

/// Granularity of a history series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryInterval {
    Daily,
    Weekly,
    Monthly,
}

impl HistoryInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryInterval::Daily => "DAILY",
            HistoryInterval::Weekly => "WEEKLY",
            HistoryInterval::Monthly => "MONTHLY",
        }
    }
}

impl FromStr for HistoryInterval {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DAILY" => Ok(HistoryInterval::Daily),
            "WEEKLY" => Ok(HistoryInterval::Weekly),
            "MONTHLY" => Ok(HistoryInterval::Monthly),
            other => Err(ValidationError::UnsupportedInterval(other.to_string())),
        }
    }
}

/// Synthetic-price usage for one asset across a history series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticUsage {
    pub asset_id: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Number of series points that used a synthetic price for this asset.
    pub days: u32,
}

/// A chronological series of snapshots plus series-level bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioHistory {
    pub portfolio_id: String,
    pub interval: HistoryInterval,
    pub points: Vec<ValuationSnapshot>,
    /// One entry per asset that ever used a synthetic price, sorted by id.
    pub synthetic_usage: Vec<SyntheticUsage>,
    /// Total transactions applied by the rolling pass. Bounded by the
    /// ledger size regardless of how many dates were requested.
    pub transactions_applied: usize,
}

/// Generates the ascending target dates for a range and interval.
///
/// Daily is every calendar day. Weekly is every Friday in range plus the
/// end date. Monthly is the last calendar day of each month in range plus
/// the end date. Collecting through a set makes the "end date is already a
/// Friday/month-end" edge dedupe structurally.
pub fn generate_target_dates(
    start: NaiveDate,
    end: NaiveDate,
    interval: HistoryInterval,
) -> Vec<NaiveDate> {
    let mut dates = BTreeSet::new();
    let mut current = start;
    while current <= end {
        let include = match interval {
            HistoryInterval::Daily => true,
            HistoryInterval::Weekly => current.weekday() == Weekday::Fri,
            HistoryInterval::Monthly => is_month_end(current),
        };
        if include {
            dates.insert(current);
        }
        current += Duration::days(1);
    }
    dates.insert(end);
    dates.into_iter().collect()
}

fn is_month_end(date: NaiveDate) -> bool {
    (date + Duration::days(1)).month() != date.month()
}
