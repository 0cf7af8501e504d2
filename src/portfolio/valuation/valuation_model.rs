//! Valuation domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market valuation of a single open position on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingValuation {
    pub asset_id: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    /// Cost of the open quantity in portfolio currency.
    pub cost_basis: Decimal,
    /// Close actually used, in the price's own currency. Absent when no
    /// price was found within the fallback window.
    pub price: Option<Decimal>,
    /// Calendar day the close belongs to (may precede the valuation date).
    pub price_date: Option<NaiveDate>,
    /// FX-service rate applied to reach portfolio currency.
    pub fx_rate: Option<Decimal>,
    /// Quantity x price x fx, in portfolio currency.
    pub market_value: Option<Decimal>,
    /// Market value minus cost basis.
    pub unrealized_gain: Option<Decimal>,
    pub realized_gain: Decimal,
    pub is_synthetic: bool,
    pub source_asset_id: Option<String>,
    pub is_inconsistent: bool,
}

/// Point-in-time portfolio valuation; also the shape of one history point.
///
/// Totals that depend on a missing price or FX rate are absent, never
/// silently wrong; `warnings` lists exactly which lookups failed and
/// `is_complete` is false for such degraded snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationSnapshot {
    pub portfolio_id: String,
    pub date: NaiveDate,
    /// Portfolio base currency all totals are expressed in.
    pub currency: String,
    /// Securities plus cash. Absent when any required lookup failed.
    pub total_value: Option<Decimal>,
    /// Absent for asset-only ledgers (`is_cash_tracked == false`) and when
    /// a cash conversion failed.
    pub total_cash: Option<Decimal>,
    pub is_cash_tracked: bool,
    pub total_cost_basis: Decimal,
    pub unrealized_gain: Option<Decimal>,
    pub realized_gain: Decimal,
    /// Unrealized plus realized. Absent whenever unrealized is.
    pub total_gain: Option<Decimal>,
    pub is_complete: bool,
    pub warnings: Vec<String>,
    /// Assets whose price came from a proxy (or provider-marked synthetic
    /// row) on this date, sorted.
    pub synthetic_assets: Vec<String>,
    /// Share of this snapshot's price lookups that were synthetic, 0..=1.
    pub synthetic_ratio: Decimal,
}
