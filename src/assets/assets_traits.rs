use super::Asset;
use crate::errors::Result;

/// Read boundary to the asset store.
pub trait AssetRepositoryTrait: Send + Sync {
    fn get_by_id(&self, asset_id: &str) -> Result<Asset>;
    fn get_by_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>>;
}
