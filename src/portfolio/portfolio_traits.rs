use super::portfolio_model::Portfolio;
use crate::errors::Result;

/// Read boundary to the portfolio store.
pub trait PortfolioRepositoryTrait: Send + Sync {
    /// Returns `Error::NotFound` for an unknown id.
    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio>;
}
