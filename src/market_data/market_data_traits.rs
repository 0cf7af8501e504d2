use chrono::NaiveDate;

use super::market_data_model::PricePoint;
use crate::errors::Result;

/// Read boundary to the price data collaborator.
///
/// Implementations own caching, circuit breaking and retries; the engine
/// only ever sees rows or a failure.
pub trait PriceSourceTrait: Send + Sync {
    /// All daily closing prices for the given assets within the date range
    /// (inclusive). Rows may already be marked synthetic by the provider.
    fn get_prices(
        &self,
        asset_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>>;
}
