use serde::{Deserialize, Serialize};

/// Portfolio metadata consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    /// Currency all valuations and cost bases are reported in.
    pub base_currency: String,
}
