use chrono::NaiveDate;

use super::BenchmarkValue;
use crate::errors::Result;

/// Read boundary to the benchmark sync collaborator.
///
/// An empty result for a requested range means the index was never synced
/// for it; the analytics orchestrator reports that as a distinct
/// benchmark-unavailable error rather than silently skipping comparison.
pub trait BenchmarkSeriesTrait: Send + Sync {
    fn get_daily_values(
        &self,
        benchmark_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkValue>>;
}
