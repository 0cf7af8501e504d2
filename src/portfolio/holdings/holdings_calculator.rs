//! Replays ledger transactions into a running `PortfolioState`.
//!
//! This is a pure leaf computation: no I/O, no FX service. Trade-currency
//! amounts are converted to portfolio currency with the broker-supplied
//! rate carried on the transaction itself (`amount / broker_rate`), because
//! that is the rate actually realized at trade time. Valuation-date
//! conversion is the valuator's job and uses the FX-service convention.

use log::warn;
use rust_decimal::Decimal;

use super::holdings_model::PortfolioState;
use super::positions_model::HoldingPosition;
use crate::errors::CalculatorError;
use crate::fx::convert_with_broker_rate;
use crate::transactions::{Transaction, TransactionType};

/// Books a cash delta in the given currency.
#[inline]
fn add_cash(state: &mut PortfolioState, currency: &str, delta: Decimal) {
    *state
        .cash_balances
        .entry(currency.to_string())
        .or_insert(Decimal::ZERO) += delta;
}

/// Applies transactions in ledger order to a `PortfolioState`.
#[derive(Debug, Clone)]
pub struct HoldingsCalculator {
    portfolio_currency: String,
}

impl HoldingsCalculator {
    pub fn new(portfolio_currency: &str) -> Self {
        HoldingsCalculator {
            portfolio_currency: portfolio_currency.to_string(),
        }
    }

    /// Replays a sorted slice of transactions into a fresh state.
    pub fn aggregate(&self, portfolio_id: &str, transactions: &[Transaction]) -> PortfolioState {
        let mut state = PortfolioState::new(portfolio_id, &self.portfolio_currency);
        for tx in transactions {
            self.apply_transaction(&mut state, tx);
        }
        state
    }

    /// Applies one transaction. Anomalies degrade to warnings on the state;
    /// replay never panics and never stops.
    pub fn apply_transaction(&self, state: &mut PortfolioState, tx: &Transaction) {
        if let Err(e) = tx.validate() {
            let reason = CalculatorError::InvalidTransaction(e.to_string());
            warn!("Skipping transaction {}: {}", tx.id, reason);
            state.push_warning(&tx.id, tx.date, reason.to_string());
            state.applied_transactions += 1;
            return;
        }

        match tx.kind {
            TransactionType::Buy => self.handle_buy(state, tx),
            TransactionType::Sell => self.handle_sell(state, tx),
            TransactionType::Deposit => self.handle_deposit(state, tx),
            TransactionType::Withdrawal => self.handle_withdrawal(state, tx),
            TransactionType::Dividend => self.handle_dividend(state, tx),
            TransactionType::Fee | TransactionType::Tax => self.handle_charge(state, tx),
        }
        state.applied_transactions += 1;
    }

    // --- Trade handlers ---

    fn handle_buy(&self, state: &mut PortfolioState, tx: &Transaction) {
        let asset_id = tx.asset_id.as_deref().unwrap_or_default();
        let gross = tx.qty() * tx.price();

        let amount = self.convert_trade_amount(tx, gross);
        let fee = self.convert_fee_amount(tx);
        let missing_rate = amount.is_none() || fee.is_none();
        if missing_rate {
            warn!(
                "No broker rate on buy {} for {}->{}. Cost booked unconverted.",
                tx.id, tx.currency, self.portfolio_currency
            );
            state.push_warning(
                &tx.id,
                tx.date,
                format!(
                    "No broker rate for {}->{} buy; cost booked unconverted",
                    tx.currency, self.portfolio_currency
                ),
            );
        }
        let cost = amount.unwrap_or(gross) + fee.unwrap_or_else(|| tx.fee_amt());

        let position = state
            .positions
            .entry(asset_id.to_string())
            .or_insert_with(|| {
                HoldingPosition::new(asset_id.to_string(), self.portfolio_currency.clone(), tx.date)
            });
        if missing_rate {
            position.flag_inconsistent();
        }
        position.add_buy(tx.qty(), cost);
    }

    fn handle_sell(&self, state: &mut PortfolioState, tx: &Transaction) {
        let asset_id = tx.asset_id.as_deref().unwrap_or_default();

        let requested = tx.qty();
        let (quantity_sold, oversold) = match state.positions.get(asset_id) {
            Some(position) => {
                let sold = position.clamp_sell_quantity(requested);
                (sold, requested > sold)
            }
            None => {
                let reason = CalculatorError::PositionNotFound {
                    asset_id: asset_id.to_string(),
                    portfolio_id: state.portfolio_id.clone(),
                };
                warn!("Sell {} skipped: {}", tx.id, reason);
                state.push_warning(&tx.id, tx.date, reason.to_string());
                return;
            }
        };

        // Proceeds for the honored portion only.
        let gross = quantity_sold * tx.price();
        let proceeds = self.convert_trade_amount(tx, gross);
        let fee = self.convert_fee_amount(tx);
        let missing_rate = proceeds.is_none() || fee.is_none();

        if oversold {
            let reason = CalculatorError::InsufficientQuantity {
                asset_id: asset_id.to_string(),
                portfolio_id: state.portfolio_id.clone(),
                date: tx.date,
            };
            warn!(
                "Sell {} requests {} but only {} held: {}. Clamping; position flagged inconsistent.",
                tx.id, requested, quantity_sold, reason
            );
            state.push_warning(&tx.id, tx.date, reason.to_string());
        }
        if missing_rate {
            // Broker rate missing on a cross-currency sell: honor the
            // quantity change with unconverted amounts and flag it.
            warn!(
                "No broker rate on sell {} for {}->{}. Proceeds booked unconverted.",
                tx.id, tx.currency, self.portfolio_currency
            );
            state.push_warning(
                &tx.id,
                tx.date,
                format!(
                    "No broker rate for {}->{} sell; proceeds booked unconverted",
                    tx.currency, self.portfolio_currency
                ),
            );
        }

        if let Some(position) = state.positions.get_mut(asset_id) {
            if oversold || missing_rate {
                position.flag_inconsistent();
            }
            position.apply_sell(
                quantity_sold,
                proceeds.unwrap_or(gross),
                fee.unwrap_or_else(|| tx.fee_amt()),
            );
        }
    }

    // --- Cash handlers ---
    // Cash is booked in the transaction's own currency; conversion to
    // portfolio currency happens at valuation time.

    fn handle_deposit(&self, state: &mut PortfolioState, tx: &Transaction) {
        add_cash(state, &tx.currency, tx.amt() - tx.fee_amt());
        state.is_cash_tracked = true;
    }

    fn handle_withdrawal(&self, state: &mut PortfolioState, tx: &Transaction) {
        add_cash(state, &tx.currency, -(tx.amt() + tx.fee_amt()));
        state.is_cash_tracked = true;
    }

    fn handle_dividend(&self, state: &mut PortfolioState, tx: &Transaction) {
        // Withholding arrives as a separate TAX transaction; the dividend
        // itself is net only of any directly attached fee.
        add_cash(state, &tx.currency, tx.amt() - tx.fee_amt());
    }

    fn handle_charge(&self, state: &mut PortfolioState, tx: &Transaction) {
        let charge = if tx.fee_amt().is_zero() {
            tx.amt()
        } else {
            tx.fee_amt()
        };
        if charge.is_zero() {
            warn!(
                "{} transaction {} has zero fee and amount. No cash change.",
                tx.kind, tx.id
            );
            return;
        }
        add_cash(state, &tx.currency, -charge.abs());
    }

    // --- Conversion helpers (broker-rate convention) ---

    /// Converts a trade-currency amount to portfolio currency via the
    /// broker rate. `None` when the rate is required but absent.
    fn convert_trade_amount(&self, tx: &Transaction, amount: Decimal) -> Option<Decimal> {
        if tx.currency == self.portfolio_currency {
            return Some(amount);
        }
        convert_with_broker_rate(amount, tx.fx_rate)
    }

    /// Fee converted to portfolio currency via the broker rate. Fees may be
    /// charged in a currency of their own.
    fn convert_fee_amount(&self, tx: &Transaction) -> Option<Decimal> {
        if tx.fee_ccy() == self.portfolio_currency {
            return Some(tx.fee_amt());
        }
        convert_with_broker_rate(tx.fee_amt(), tx.fx_rate)
    }
}
