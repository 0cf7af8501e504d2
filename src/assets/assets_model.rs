//! Asset metadata consumed by the valuation engine.

use serde::{Deserialize, Serialize};

/// Broad asset classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    #[default]
    Equity,
    Etf,
    Bond,
    Crypto,
    Commodity,
    Cash,
    Other,
}

/// An investable instrument, identified by (ticker, exchange).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub ticker: String,
    pub exchange: String,
    pub name: Option<String>,
    /// Currency the instrument trades in, e.g. "USD".
    pub currency: String,
    pub asset_class: AssetClass,
    pub is_active: bool,
    /// Comparable asset whose prices stand in when this asset has no
    /// market data of its own (synthetic backcasting).
    pub proxy_asset_id: Option<String>,
}

impl Asset {
    pub fn new(id: &str, ticker: &str, exchange: &str, currency: &str) -> Self {
        Asset {
            id: id.to_string(),
            ticker: ticker.to_string(),
            exchange: exchange.to_string(),
            name: None,
            currency: currency.to_string(),
            asset_class: AssetClass::default(),
            is_active: true,
            proxy_asset_id: None,
        }
    }
}
