//! In-memory price lookup built from a batched fetch.

use chrono::{Duration, NaiveDate};
use log::debug;
use std::collections::{BTreeMap, HashMap};

use super::market_data_model::{PriceLookup, PricePoint};

/// Per-asset daily close series with bounded nearest-earlier fallback and
/// proxy substitution.
#[derive(Debug, Default, Clone)]
pub struct PriceTable {
    prices: HashMap<String, BTreeMap<NaiveDate, PricePoint>>,
}

impl PriceTable {
    pub fn new(points: Vec<PricePoint>) -> Self {
        let mut table = PriceTable {
            prices: HashMap::new(),
        };
        table.add_points(points);
        table
    }

    pub fn add_points(&mut self, points: Vec<PricePoint>) {
        for point in points {
            self.prices
                .entry(point.asset_id.clone())
                .or_default()
                .insert(point.date, point);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Closing price for `asset_id` on `date`, or the nearest earlier close
    /// within `window_days`. When the asset has no observation at all in
    /// the window, the configured proxy asset's series is searched instead
    /// and the result is marked synthetic.
    ///
    /// Returns `None` when neither series has a usable close; the caller
    /// decides how the snapshot degrades.
    pub fn lookup(
        &self,
        asset_id: &str,
        proxy_asset_id: Option<&str>,
        date: NaiveDate,
        window_days: i64,
    ) -> Option<PriceLookup> {
        if let Some(found) = self.lookup_series(asset_id, date, window_days) {
            return Some(found);
        }

        let proxy = proxy_asset_id?;
        let mut substituted = self.lookup_series(proxy, date, window_days)?;
        debug!(
            "No native price for {} on {} within {} days; substituting proxy {} close from {}",
            asset_id, date, window_days, proxy, substituted.actual_date
        );
        substituted.is_synthetic = true;
        substituted.source_asset_id = Some(proxy.to_string());
        Some(substituted)
    }

    fn lookup_series(
        &self,
        asset_id: &str,
        date: NaiveDate,
        window_days: i64,
    ) -> Option<PriceLookup> {
        let series = self.prices.get(asset_id)?;
        let earliest = date - Duration::days(window_days);
        let (actual_date, point) = series.range(earliest..=date).next_back()?;
        Some(PriceLookup {
            close: point.close,
            currency: point.currency.clone(),
            actual_date: *actual_date,
            is_synthetic: point.is_synthetic,
            source_asset_id: point.source_asset_id.clone(),
        })
    }
}
