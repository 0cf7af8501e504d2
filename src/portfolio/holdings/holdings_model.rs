//! Aggregated ledger state - positions plus per-currency cash.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::positions_model::HoldingPosition;

/// A non-fatal anomaly encountered while replaying the ledger. Replay
/// continues; the warning travels with the derived state so callers can see
/// exactly what degraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayWarning {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub message: String,
}

impl std::fmt::Display for ReplayWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transaction {} ({}): {}",
            self.transaction_id, self.date, self.message
        )
    }
}

/// The running state maintained by the rolling replay: every open (or
/// previously open) position, per-currency cash balances, and bookkeeping.
/// Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioState {
    pub portfolio_id: String,
    /// Portfolio base currency; all cost bases are kept in it.
    pub currency: String,
    pub positions: HashMap<String, HoldingPosition>,
    /// Running balance per cash currency.
    pub cash_balances: HashMap<String, Decimal>,
    /// True once a DEPOSIT or WITHDRAWAL has been seen. Distinguishes real
    /// brokerage ledgers from asset-only ledgers, whose cash is reported as
    /// absent rather than zero.
    pub is_cash_tracked: bool,
    /// Count of transactions applied so far. Monotone non-decreasing; the
    /// rolling engine's O(transactions + dates) guarantee is observable
    /// through it.
    pub applied_transactions: usize,
    pub warnings: Vec<ReplayWarning>,
}

impl PortfolioState {
    pub fn new(portfolio_id: &str, currency: &str) -> Self {
        PortfolioState {
            portfolio_id: portfolio_id.to_string(),
            currency: currency.to_string(),
            positions: HashMap::new(),
            cash_balances: HashMap::new(),
            is_cash_tracked: false,
            applied_transactions: 0,
            warnings: Vec::new(),
        }
    }

    /// Positions currently held (quantity above the closed threshold).
    pub fn open_positions(&self) -> impl Iterator<Item = &HoldingPosition> {
        self.positions.values().filter(|p| p.is_open())
    }

    /// Realized gain summed across every position, open or closed.
    pub fn total_realized_gain(&self) -> Decimal {
        self.positions.values().map(|p| p.realized_gain).sum()
    }

    /// Cost basis summed across open positions (portfolio currency).
    pub fn total_cost_basis(&self) -> Decimal {
        self.open_positions().map(|p| p.total_cost_basis).sum()
    }

    pub fn push_warning(&mut self, transaction_id: &str, date: NaiveDate, message: String) {
        self.warnings.push(ReplayWarning {
            transaction_id: transaction_id.to_string(),
            date,
            message,
        });
    }
}
