//! Market data domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily closing price for an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub asset_id: String,
    pub date: NaiveDate,
    pub close: Decimal,
    /// Currency of `close`, normally the asset's trading currency.
    pub currency: String,
    /// True when the price was not observed on market but derived from a
    /// proxy asset (synthetic backcasting).
    #[serde(default)]
    pub is_synthetic: bool,
    /// The asset whose data was actually used, when `is_synthetic`.
    #[serde(default)]
    pub source_asset_id: Option<String>,
}

impl PricePoint {
    pub fn observed(asset_id: &str, date: NaiveDate, close: Decimal, currency: &str) -> Self {
        PricePoint {
            asset_id: asset_id.to_string(),
            date,
            close,
            currency: currency.to_string(),
            is_synthetic: false,
            source_asset_id: None,
        }
    }
}

/// Result of a price-table lookup: the close actually used, where it came
/// from and which calendar day it belongs to.
///
/// `actual_date` can be earlier than the requested date when the fallback
/// window absorbed a weekend or holiday; FX conversion of the resulting
/// value must use this date, not the valuation date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLookup {
    pub close: Decimal,
    pub currency: String,
    pub actual_date: NaiveDate,
    pub is_synthetic: bool,
    pub source_asset_id: Option<String>,
}
