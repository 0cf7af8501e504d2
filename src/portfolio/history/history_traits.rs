use chrono::NaiveDate;

use super::history_model::{HistoryInterval, PortfolioHistory};
use crate::errors::Result;
use crate::portfolio::holdings::HoldingPosition;
use crate::portfolio::valuation::{HoldingValuation, ValuationSnapshot};

/// Contract for history/valuation reads, implemented by `HistoryService`
/// and mockable in tests of downstream consumers.
pub trait HistoryServiceTrait: Send + Sync {
    fn get_history(
        &self,
        portfolio_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: HistoryInterval,
    ) -> Result<PortfolioHistory>;

    fn get_valuation(&self, portfolio_id: &str, date: NaiveDate) -> Result<ValuationSnapshot>;

    fn get_holdings(&self, portfolio_id: &str, date: NaiveDate) -> Result<Vec<HoldingPosition>>;

    fn get_holdings_valued(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<HoldingValuation>>;
}
