use chrono::NaiveDate;

use super::Transaction;
use crate::errors::Result;

/// Read boundary to the transaction store.
///
/// Implementations return a snapshot-consistent view; the engine performs
/// no retries and treats any failure as terminal for the call.
pub trait TransactionRepositoryTrait: Send + Sync {
    /// All transactions for a portfolio with `date <= as_of`, ordered by
    /// (date, insertion sequence).
    fn get_transactions_up_to(
        &self,
        portfolio_id: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<Transaction>>;
}
