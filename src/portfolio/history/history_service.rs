//! Rolling-state history engine.
//!
//! Recomputing positions from scratch for every requested date is
//! O(dates x transactions). This engine fetches everything once, then
//! walks the target dates with one mutable state and a transaction
//! cursor, applying each transaction exactly once: O(transactions + dates).

use chrono::{Duration, NaiveDate};
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use super::history_model::{
    generate_target_dates, HistoryInterval, PortfolioHistory, SyntheticUsage,
};
use super::history_traits::HistoryServiceTrait;
use crate::assets::{Asset, AssetRepositoryTrait};
use crate::errors::{Result, ValidationError};
use crate::fx::{FxRateTable, FxSourceTrait};
use crate::market_data::{PriceSourceTrait, PriceTable};
use crate::portfolio::holdings::{HoldingPosition, HoldingsCalculator, PortfolioState};
use crate::portfolio::portfolio_traits::PortfolioRepositoryTrait;
use crate::portfolio::valuation::{calculate_valuation, value_holding, HoldingValuation};
use crate::portfolio::valuation::ValuationSnapshot;
use crate::settings::ValuationSettings;
use crate::transactions::{sort_transactions, Transaction, TransactionRepositoryTrait};

pub struct HistoryService {
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    price_source: Arc<dyn PriceSourceTrait>,
    fx_source: Arc<dyn FxSourceTrait>,
    settings: ValuationSettings,
}

/// Everything the rolling pass needs, fetched up front in a fixed number
/// of collaborator calls.
struct HistoryInputs {
    portfolio_currency: String,
    transactions: Vec<Transaction>,
    assets: HashMap<String, Asset>,
    prices: PriceTable,
    fx: FxRateTable,
}

impl HistoryService {
    pub fn new(
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        price_source: Arc<dyn PriceSourceTrait>,
        fx_source: Arc<dyn FxSourceTrait>,
        settings: ValuationSettings,
    ) -> Self {
        Self {
            portfolio_repository,
            transaction_repository,
            asset_repository,
            price_source,
            fx_source,
            settings,
        }
    }
}

impl HistoryServiceTrait for HistoryService {
    /// Chronological snapshots across `[start, end]` at the requested
    /// interval, produced by a single linear pass.
    fn get_history(
        &self,
        portfolio_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: HistoryInterval,
    ) -> Result<PortfolioHistory> {
        if start > end {
            return Err(ValidationError::InvalidDateRange { start, end }.into());
        }

        let inputs = self.fetch_inputs(portfolio_id, start, end)?;
        let target_dates = generate_target_dates(start, end, interval);
        debug!(
            "History for {}: {} transactions, {} target dates",
            portfolio_id,
            inputs.transactions.len(),
            target_dates.len()
        );

        let calculator = HoldingsCalculator::new(&inputs.portfolio_currency);
        let mut state = PortfolioState::new(portfolio_id, &inputs.portfolio_currency);
        let mut cursor = 0usize;
        let mut points = Vec::with_capacity(target_dates.len());
        let mut synthetic: BTreeMap<String, SyntheticUsage> = BTreeMap::new();

        for target_date in target_dates {
            // Advance the cursor; each transaction is applied exactly once.
            while cursor < inputs.transactions.len()
                && inputs.transactions[cursor].date <= target_date
            {
                calculator.apply_transaction(&mut state, &inputs.transactions[cursor]);
                cursor += 1;
            }

            let snapshot = calculate_valuation(
                &state,
                &inputs.assets,
                &inputs.prices,
                &inputs.fx,
                target_date,
                &self.settings,
            );

            for asset_id in &snapshot.synthetic_assets {
                synthetic
                    .entry(asset_id.clone())
                    .and_modify(|usage| {
                        usage.last_date = target_date;
                        usage.days += 1;
                    })
                    .or_insert_with(|| SyntheticUsage {
                        asset_id: asset_id.clone(),
                        first_date: target_date,
                        last_date: target_date,
                        days: 1,
                    });
            }

            points.push(snapshot);
        }

        Ok(PortfolioHistory {
            portfolio_id: portfolio_id.to_string(),
            interval,
            points,
            synthetic_usage: synthetic.into_values().collect(),
            transactions_applied: state.applied_transactions,
        })
    }

    /// Point-in-time valuation: a single-date daily history, so it agrees
    /// with the matching point of any `get_history` call by construction.
    fn get_valuation(&self, portfolio_id: &str, date: NaiveDate) -> Result<ValuationSnapshot> {
        let mut history = self.get_history(portfolio_id, date, date, HistoryInterval::Daily)?;
        history
            .points
            .pop()
            .ok_or_else(|| crate::errors::Error::Unexpected("Empty single-date history".into()))
    }

    /// Open positions (quantity, weighted-average cost, realized gain) as
    /// of `date`.
    fn get_holdings(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<HoldingPosition>> {
        let state = self.aggregate_state(portfolio_id, date)?.1;
        let mut holdings: Vec<HoldingPosition> = state.open_positions().cloned().collect();
        holdings.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));
        Ok(holdings)
    }

    /// Open positions as of `date` with per-holding market value and P&L.
    fn get_holdings_valued(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<HoldingValuation>> {
        let (inputs, state) = self.aggregate_state(portfolio_id, date)?;
        let mut valued: Vec<HoldingValuation> = state
            .open_positions()
            .map(|position| {
                value_holding(
                    position,
                    &inputs.assets,
                    &inputs.prices,
                    &inputs.fx,
                    date,
                    &state.currency,
                    &self.settings,
                )
            })
            .collect();
        valued.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));
        Ok(valued)
    }
}

impl HistoryService {
    fn aggregate_state(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
    ) -> Result<(HistoryInputs, PortfolioState)> {
        let inputs = self.fetch_inputs(portfolio_id, date, date)?;
        let calculator = HoldingsCalculator::new(&inputs.portfolio_currency);
        let state = calculator.aggregate(portfolio_id, &inputs.transactions);
        Ok((inputs, state))
    }

    /// The fixed set of collaborator reads: portfolio, ledger, asset
    /// metadata, one batched price fetch and one batched FX fetch, both
    /// extended backward by the fallback windows.
    fn fetch_inputs(
        &self,
        portfolio_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoryInputs> {
        let portfolio = self.portfolio_repository.get_by_id(portfolio_id)?;

        let mut transactions = self
            .transaction_repository
            .get_transactions_up_to(portfolio_id, end)?;
        sort_transactions(&mut transactions);

        let asset_ids: Vec<String> = {
            let unique: HashSet<String> = transactions
                .iter()
                .filter_map(|tx| tx.asset_id.clone())
                .collect();
            let mut ids: Vec<String> = unique.into_iter().collect();
            ids.sort();
            ids
        };
        let mut assets: HashMap<String, Asset> = self
            .asset_repository
            .get_by_ids(&asset_ids)?
            .into_iter()
            .map(|asset| (asset.id.clone(), asset))
            .collect();

        // Proxies must be fetched alongside their dependents, metadata
        // included: a proxy can trade in its own currency.
        let proxy_ids: Vec<String> = {
            let unique: HashSet<String> = assets
                .values()
                .filter_map(|asset| asset.proxy_asset_id.clone())
                .filter(|id| !assets.contains_key(id))
                .collect();
            let mut ids: Vec<String> = unique.into_iter().collect();
            ids.sort();
            ids
        };
        if !proxy_ids.is_empty() {
            assets.extend(
                self.asset_repository
                    .get_by_ids(&proxy_ids)?
                    .into_iter()
                    .map(|asset| (asset.id.clone(), asset)),
            );
        }

        let mut price_ids: Vec<String> = asset_ids.clone();
        for proxy in &proxy_ids {
            if !price_ids.contains(proxy) {
                price_ids.push(proxy.clone());
            }
        }
        price_ids.sort();

        let price_start = start - Duration::days(self.settings.price_fallback_days);
        let price_rows = self.price_source.get_prices(&price_ids, price_start, end)?;

        // FX observations can be needed as far back as the oldest price a
        // snapshot may fall back to, plus the FX window itself. The price
        // rows contribute their own currencies so a close quoted in a
        // currency the metadata does not mention still converts.
        let currencies: Vec<String> = {
            let mut unique: HashSet<String> = assets.values().map(|a| a.currency.clone()).collect();
            unique.extend(transactions.iter().map(|tx| tx.currency.clone()));
            unique.extend(price_rows.iter().map(|row| row.currency.clone()));
            unique.remove(&portfolio.base_currency);
            let mut list: Vec<String> = unique.into_iter().collect();
            list.sort();
            list
        };
        let prices = PriceTable::new(price_rows);
        let fx_start = price_start - Duration::days(self.settings.fx_fallback_days);
        let fx = FxRateTable::new(self.fx_source.get_rates(
            &currencies,
            &portfolio.base_currency,
            fx_start,
            end,
        )?);

        Ok(HistoryInputs {
            portfolio_currency: portfolio.base_currency,
            transactions,
            assets,
            prices,
            fx,
        })
    }
}
