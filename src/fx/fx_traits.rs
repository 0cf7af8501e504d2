use chrono::NaiveDate;

use super::fx_model::FxRatePoint;
use crate::errors::Result;

/// Read boundary to the FX data collaborator.
pub trait FxSourceTrait: Send + Sync {
    /// All daily rates converting each of `currencies` into
    /// `portfolio_currency` within the date range (inclusive). The caller
    /// extends the range backward by its fallback window.
    fn get_rates(
        &self,
        currencies: &[String],
        portfolio_currency: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FxRatePoint>>;
}
