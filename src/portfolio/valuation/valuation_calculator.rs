//! Point-in-time valuation over pre-fetched lookup tables.
//!
//! Pure functions: the history engine calls them once per target date
//! without issuing any queries. Price lookups fall back a bounded number
//! of days and may substitute a proxy asset's close; FX conversion of a
//! position's value is dated at the price's *actual* date, not the
//! valuation date, with its own bounded fallback.

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::valuation_model::{HoldingValuation, ValuationSnapshot};
use crate::assets::Asset;
use crate::constants::DECIMAL_PRECISION;
use crate::fx::FxRateTable;
use crate::market_data::PriceTable;
use crate::portfolio::holdings::{HoldingPosition, PortfolioState};
use crate::settings::ValuationSettings;

/// Values one open position on `date`. Missing data yields absent fields,
/// never zeros.
pub fn value_holding(
    position: &HoldingPosition,
    assets: &HashMap<String, Asset>,
    prices: &PriceTable,
    fx: &FxRateTable,
    date: NaiveDate,
    portfolio_currency: &str,
    settings: &ValuationSettings,
) -> HoldingValuation {
    let proxy = assets
        .get(&position.asset_id)
        .and_then(|a| a.proxy_asset_id.as_deref());

    let mut valuation = HoldingValuation {
        asset_id: position.asset_id.clone(),
        quantity: position.quantity,
        average_cost: position.average_cost,
        cost_basis: position.total_cost_basis,
        price: None,
        price_date: None,
        fx_rate: None,
        market_value: None,
        unrealized_gain: None,
        realized_gain: position.realized_gain,
        is_synthetic: false,
        source_asset_id: None,
        is_inconsistent: position.is_inconsistent,
    };

    let Some(hit) = prices.lookup(&position.asset_id, proxy, date, settings.price_fallback_days)
    else {
        return valuation;
    };

    valuation.price = Some(hit.close);
    valuation.price_date = Some(hit.actual_date);
    valuation.is_synthetic = hit.is_synthetic;
    valuation.source_asset_id = hit.source_asset_id.clone();

    // FX is dated at the close's own day: a Friday price converted with a
    // Friday rate, even when valuing the Sunday after.
    let rate = match fx.get_rate(
        &hit.currency,
        portfolio_currency,
        hit.actual_date,
        settings.fx_fallback_days,
    ) {
        Ok(rate) => rate,
        Err(e) => {
            warn!(
                "FX lookup failed valuing {} on {}: {}",
                position.asset_id, date, e
            );
            return valuation;
        }
    };

    let market_value = (position.quantity * hit.close * rate).round_dp(DECIMAL_PRECISION);
    valuation.fx_rate = Some(rate);
    valuation.market_value = Some(market_value);
    valuation.unrealized_gain = Some(market_value - position.total_cost_basis);
    valuation
}

/// Values the whole portfolio state on `date`.
pub fn calculate_valuation(
    state: &PortfolioState,
    assets: &HashMap<String, Asset>,
    prices: &PriceTable,
    fx: &FxRateTable,
    date: NaiveDate,
    settings: &ValuationSettings,
) -> ValuationSnapshot {
    let mut warnings: Vec<String> = Vec::new();
    let mut synthetic_assets: Vec<String> = Vec::new();
    let mut lookups = 0u32;
    let mut synthetic_lookups = 0u32;

    let mut securities_value = Some(Decimal::ZERO);
    let mut open_positions: Vec<&HoldingPosition> = state.open_positions().collect();
    open_positions.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));

    for position in open_positions {
        lookups += 1;
        let valued = value_holding(
            position,
            assets,
            prices,
            fx,
            date,
            &state.currency,
            settings,
        );

        if valued.is_synthetic {
            synthetic_lookups += 1;
            synthetic_assets.push(position.asset_id.clone());
        }

        match valued.market_value {
            Some(value) => {
                securities_value = securities_value.map(|total| total + value);
            }
            None => {
                // A single unresolvable holding poisons every total that
                // depends on it.
                securities_value = None;
                if valued.price.is_none() {
                    warnings.push(format!(
                        "No price for {} on {} within {} days",
                        position.asset_id, date, settings.price_fallback_days
                    ));
                } else {
                    warnings.push(format!(
                        "No FX rate to {} for {} priced on {}",
                        state.currency,
                        position.asset_id,
                        valued.price_date.unwrap_or(date)
                    ));
                }
            }
        }
    }

    // Cash: converted at the valuation date itself.
    let total_cash = if state.is_cash_tracked {
        let mut cash_total = Some(Decimal::ZERO);
        for (currency, amount) in &state.cash_balances {
            match fx.convert(
                *amount,
                currency,
                &state.currency,
                date,
                settings.fx_fallback_days,
            ) {
                Ok(converted) => {
                    cash_total = cash_total.map(|total| total + converted);
                }
                Err(e) => {
                    warn!("Cash conversion failed on {}: {}", date, e);
                    warnings.push(format!(
                        "No FX rate for cash {}->{} on {}",
                        currency, state.currency, date
                    ));
                    cash_total = None;
                }
            }
        }
        cash_total.map(|total| total.round_dp(DECIMAL_PRECISION))
    } else {
        None
    };

    let cash_degraded = state.is_cash_tracked && total_cash.is_none();
    let total_value = match (securities_value, total_cash, state.is_cash_tracked) {
        (Some(securities), Some(cash), true) => Some(securities + cash),
        (Some(securities), None, false) => Some(securities),
        _ => None,
    }
    .map(|total| total.round_dp(DECIMAL_PRECISION));

    let total_cost_basis = state.total_cost_basis().round_dp(DECIMAL_PRECISION);
    let realized_gain = state.total_realized_gain().round_dp(DECIMAL_PRECISION);
    let unrealized_gain = securities_value
        .map(|value| (value - state.total_cost_basis()).round_dp(DECIMAL_PRECISION));
    let total_gain = unrealized_gain.map(|unrealized| unrealized + realized_gain);

    let synthetic_ratio = if lookups == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(synthetic_lookups) / Decimal::from(lookups)).round_dp(DECIMAL_PRECISION)
    };

    let is_complete = securities_value.is_some() && !cash_degraded;

    ValuationSnapshot {
        portfolio_id: state.portfolio_id.clone(),
        date,
        currency: state.currency.clone(),
        total_value,
        total_cash,
        is_cash_tracked: state.is_cash_tracked,
        total_cost_basis,
        unrealized_gain,
        realized_gain,
        total_gain,
        is_complete,
        warnings,
        synthetic_assets,
        synthetic_ratio,
    }
}
