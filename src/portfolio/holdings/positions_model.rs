//! Position domain model - weighted-average-cost accounting for one asset.

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::QUANTITY_THRESHOLD;

/// True when a quantity is large enough to treat the position as open.
pub fn is_quantity_significant(quantity: &Decimal) -> bool {
    let threshold = Decimal::from_str(QUANTITY_THRESHOLD).unwrap_or_else(|_| Decimal::new(1, 8));
    quantity.abs() >= threshold
}

/// A holding in one asset, derived by replaying its transactions.
///
/// Cost figures are kept in the portfolio's base currency, converted at
/// trade time with the broker-supplied rate. Invariants: `quantity >= 0`;
/// `total_cost_basis == 0` exactly when `quantity == 0`; a sell never
/// changes `average_cost` (weighted-average cost method).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPosition {
    pub asset_id: String,
    pub quantity: Decimal,
    /// Total cost of the open quantity, in portfolio currency.
    pub total_cost_basis: Decimal,
    /// Cost per unit of the open quantity, in portfolio currency.
    pub average_cost: Decimal,
    /// Realized gain accumulated over all sells so far, in portfolio
    /// currency, net of fees.
    pub realized_gain: Decimal,
    /// Currency of the cost figures (the portfolio's base currency).
    pub currency: String,
    pub inception_date: NaiveDate,
    /// Set when replay hit an anomaly (oversell, missing broker rate on a
    /// cross-currency trade) and degraded instead of failing.
    #[serde(default)]
    pub is_inconsistent: bool,
}

/// Quantities actually moved by a sell after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SellOutcome {
    pub quantity_sold: Decimal,
    pub cost_removed: Decimal,
}

impl HoldingPosition {
    pub fn new(asset_id: String, currency: String, date: NaiveDate) -> Self {
        HoldingPosition {
            asset_id,
            quantity: Decimal::ZERO,
            total_cost_basis: Decimal::ZERO,
            average_cost: Decimal::ZERO,
            realized_gain: Decimal::ZERO,
            currency,
            inception_date: date,
            is_inconsistent: false,
        }
    }

    pub fn is_open(&self) -> bool {
        is_quantity_significant(&self.quantity)
    }

    /// Adds a purchase. `total_cost` is the full acquisition cost in
    /// portfolio currency, fees included.
    pub fn add_buy(&mut self, quantity: Decimal, total_cost: Decimal) {
        if !quantity.is_sign_positive() {
            warn!(
                "Skipping buy with non-positive quantity {} for position {}",
                quantity, self.asset_id
            );
            return;
        }
        self.quantity += quantity;
        self.total_cost_basis += total_cost;
        self.average_cost = if self.quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.total_cost_basis / self.quantity
        };
    }

    /// Removes up to `quantity` units at the current average cost and books
    /// the realized gain. `proceeds` and `fee` are in portfolio currency
    /// and must correspond to the clamped quantity the caller computed via
    /// [`HoldingPosition::clamp_sell_quantity`].
    pub fn apply_sell(&mut self, quantity: Decimal, proceeds: Decimal, fee: Decimal) -> SellOutcome {
        let quantity_sold = quantity.min(self.quantity);
        let cost_removed = quantity_sold * self.average_cost;

        self.realized_gain += proceeds - cost_removed - fee;
        self.quantity -= quantity_sold;
        self.total_cost_basis -= cost_removed;

        if !self.is_open() {
            // Closed out: zero the aggregates so rounding dust cannot leave
            // a phantom cost basis behind.
            self.quantity = Decimal::ZERO;
            self.total_cost_basis = Decimal::ZERO;
            self.average_cost = Decimal::ZERO;
        }

        SellOutcome {
            quantity_sold,
            cost_removed,
        }
    }

    /// The portion of a requested sell that can actually be honored.
    /// Anything beyond the held quantity is an anomaly the caller flags.
    pub fn clamp_sell_quantity(&self, requested: Decimal) -> Decimal {
        requested.min(self.quantity).max(Decimal::ZERO)
    }

    pub fn flag_inconsistent(&mut self) {
        self.is_inconsistent = true;
    }
}
