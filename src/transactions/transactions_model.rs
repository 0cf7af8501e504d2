//! Ledger domain models.
//!
//! Transactions are the only durable input of the engine; every other
//! entity (positions, snapshots, history points) is derived on demand.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ValidationError;

/// Canonical transaction kinds.
///
/// BUY/SELL reference exactly one asset; the remaining kinds are pure cash
/// movements and reference none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Buy,
    Sell,
    Deposit,
    Withdrawal,
    Dividend,
    Fee,
    Tax,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::Dividend => "DIVIDEND",
            TransactionType::Fee => "FEE",
            TransactionType::Tax => "TAX",
        }
    }

    /// True for the kinds that make a portfolio cash-tracked.
    pub fn is_external_cash_flow(&self) -> bool {
        matches!(self, TransactionType::Deposit | TransactionType::Withdrawal)
    }

    /// True for the kinds that mutate a security position.
    pub fn is_trade(&self) -> bool {
        matches!(self, TransactionType::Buy | TransactionType::Sell)
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(TransactionType::Buy),
            "SELL" => Ok(TransactionType::Sell),
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            "DIVIDEND" => Ok(TransactionType::Dividend),
            "FEE" => Ok(TransactionType::Fee),
            "TAX" => Ok(TransactionType::Tax),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown transaction type: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ledger entry. Immutable once created apart from correction of
/// non-identity fields; `kind`, `asset_id` and `portfolio_id` never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    // Identity
    pub id: String,
    pub portfolio_id: String,
    /// None for pure cash movements (DEPOSIT, WITHDRAWAL, FEE, TAX and
    /// portfolio-level DIVIDEND entries).
    pub asset_id: Option<String>,

    // Classification
    pub kind: TransactionType,

    // Ordering: date first, insertion sequence as the stable tie-break.
    pub date: NaiveDate,
    pub sequence: i64,

    // Economics (trade currency)
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub currency: String,
    pub fee: Option<Decimal>,
    pub fee_currency: Option<String>,

    /// Broker-supplied exchange rate under the convention
    /// 1 portfolio-currency unit = `fx_rate` x trade-currency units.
    /// This is the *inverse* of the FX-service convention.
    pub fx_rate: Option<Decimal>,

    /// Free-form broker metadata, carried through untouched.
    pub metadata: Option<serde_json::Value>,
}

impl Transaction {
    /// Get quantity, defaulting to zero if not set
    pub fn qty(&self) -> Decimal {
        self.quantity.unwrap_or(Decimal::ZERO)
    }

    /// Get unit price, defaulting to zero if not set
    pub fn price(&self) -> Decimal {
        self.unit_price.unwrap_or(Decimal::ZERO)
    }

    /// Get amount, defaulting to zero if not set
    pub fn amt(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }

    /// Get fee, defaulting to zero if not set
    pub fn fee_amt(&self) -> Decimal {
        self.fee.unwrap_or(Decimal::ZERO)
    }

    /// Currency the fee was charged in, defaulting to the trade currency.
    pub fn fee_ccy(&self) -> &str {
        self.fee_currency.as_deref().unwrap_or(&self.currency)
    }

    /// Validates the fields that replay relies on. BUY/SELL require a
    /// positive quantity and an asset reference.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.kind.is_trade() {
            if self.asset_id.is_none() {
                return Err(ValidationError::MissingField("assetId".to_string()));
            }
            if self.qty() <= Decimal::ZERO {
                return Err(ValidationError::InvalidInput(format!(
                    "{} transaction {} must have a positive quantity",
                    self.kind, self.id
                )));
            }
        }
        Ok(())
    }
}

/// Sorts a ledger into replay order: date ascending, insertion sequence as
/// the stable tie-break for same-day entries.
pub fn sort_transactions(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.sequence.cmp(&b.sequence)));
}
