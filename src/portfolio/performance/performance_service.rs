//! Analytics orchestrator.
//!
//! Fetches the daily history once, extracts external cash flows from the
//! ledger and delegates to the pure calculators. Results are cached
//! behind a mutex with time-based expiry; ledger mutations do not
//! invalidate entries, callers force recomputation with `clear_cache`.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::benchmark_calculator::compare_to_benchmark;
use super::performance_model::{
    AnalyticsReport, CashFlow, PerformanceSummary, SeriesPoint,
};
use super::returns_calculator::{
    annualized_return, daily_returns, simple_return, time_weighted_return, xirr,
};
use super::risk_calculator::calculate_risk;
use crate::benchmarks::BenchmarkSeriesTrait;
use crate::errors::{Error, Result, ValidationError};
use crate::fx::convert_with_broker_rate;
use crate::portfolio::history::{HistoryInterval, HistoryServiceTrait};
use crate::settings::ValuationSettings;
use crate::transactions::{Transaction, TransactionRepositoryTrait};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AnalyticsCacheKey {
    portfolio_id: String,
    start: NaiveDate,
    end: NaiveDate,
    benchmark_id: Option<String>,
    risk_free_rate: Decimal,
}

struct CacheEntry {
    inserted_at: Instant,
    report: AnalyticsReport,
}

pub struct PerformanceService {
    history_service: Arc<dyn HistoryServiceTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    benchmark_series: Arc<dyn BenchmarkSeriesTrait>,
    settings: ValuationSettings,
    cache: Mutex<HashMap<AnalyticsCacheKey, CacheEntry>>,
}

impl PerformanceService {
    pub fn new(
        history_service: Arc<dyn HistoryServiceTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        benchmark_series: Arc<dyn BenchmarkSeriesTrait>,
        settings: ValuationSettings,
    ) -> Self {
        Self {
            history_service,
            transaction_repository,
            benchmark_series,
            settings,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Full analytics for a portfolio over `[start, end]`, optionally
    /// compared against a benchmark. `risk_free_rate` is annual; falls
    /// back to the configured default when absent.
    pub fn get_analytics(
        &self,
        portfolio_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        benchmark_id: Option<&str>,
        risk_free_rate: Option<Decimal>,
    ) -> Result<AnalyticsReport> {
        if start > end {
            return Err(ValidationError::InvalidDateRange { start, end }.into());
        }
        let risk_free = risk_free_rate.unwrap_or(self.settings.default_risk_free_rate);
        let key = AnalyticsCacheKey {
            portfolio_id: portfolio_id.to_string(),
            start,
            end,
            benchmark_id: benchmark_id.map(|s| s.to_string()),
            risk_free_rate: risk_free,
        };

        if let Some(report) = self.cached(&key) {
            debug!("Analytics cache hit for {}", portfolio_id);
            return Ok(report);
        }

        let report = self.compute(portfolio_id, start, end, benchmark_id, risk_free)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                key,
                CacheEntry {
                    inserted_at: Instant::now(),
                    report: report.clone(),
                },
            );
        }
        Ok(report)
    }

    /// Drops every cached report, forcing the next call to recompute.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn cached(&self, key: &AnalyticsCacheKey) -> Option<AnalyticsReport> {
        let cache = self.cache.lock().ok()?;
        let entry = cache.get(key)?;
        if entry.inserted_at.elapsed() < self.settings.analytics_cache_ttl {
            Some(entry.report.clone())
        } else {
            None
        }
    }

    fn compute(
        &self,
        portfolio_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        benchmark_id: Option<&str>,
        risk_free: Decimal,
    ) -> Result<AnalyticsReport> {
        // Risk and benchmark statistics need daily resolution, whatever
        // granularity the caller displays at.
        let history =
            self.history_service
                .get_history(portfolio_id, start, end, HistoryInterval::Daily)?;
        let currency = history
            .points
            .first()
            .map(|p| p.currency.clone())
            .unwrap_or_default();

        let mut warnings: Vec<String> = Vec::new();
        let series: Vec<SeriesPoint> = history
            .points
            .iter()
            .filter_map(|p| p.total_value.map(|value| SeriesPoint::new(p.date, value)))
            .collect();
        let dropped = history.points.len() - series.len();
        if dropped > 0 {
            warnings.push(format!(
                "{} of {} days had incomplete valuations and were excluded",
                dropped,
                history.points.len()
            ));
        }

        let transactions = self
            .transaction_repository
            .get_transactions_up_to(portfolio_id, end)?;
        let external_flows = self.extract_flows(&transactions, &currency, start, end, &mut warnings);
        let flows_by_date: BTreeMap<NaiveDate, Decimal> = {
            let mut map: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
            for flow in &external_flows {
                *map.entry(flow.date).or_insert(Decimal::ZERO) += flow.amount;
            }
            map
        };

        let performance = build_performance(start, end, &series, &external_flows, &flows_by_date);
        let risk = calculate_risk(
            &series,
            &flows_by_date,
            risk_free,
            self.settings.var_confidence,
        );

        let benchmark = match benchmark_id {
            Some(id) => Some(self.compare(id, &series, &flows_by_date, risk_free, start, end)?),
            None => None,
        };

        Ok(AnalyticsReport {
            portfolio_id: portfolio_id.to_string(),
            currency,
            performance,
            risk,
            benchmark,
            warnings,
        })
    }

    /// Deposits and withdrawals within the period, signed from the
    /// portfolio's perspective and converted to portfolio currency via
    /// the broker rate carried on each transaction.
    fn extract_flows(
        &self,
        transactions: &[Transaction],
        portfolio_currency: &str,
        start: NaiveDate,
        end: NaiveDate,
        warnings: &mut Vec<String>,
    ) -> Vec<CashFlow> {
        let mut flows = Vec::new();
        for tx in transactions {
            if !tx.kind.is_external_cash_flow() || tx.date < start || tx.date > end {
                continue;
            }
            let gross = tx.amt();
            let amount = if tx.currency == portfolio_currency {
                gross
            } else {
                match convert_with_broker_rate(gross, tx.fx_rate) {
                    Some(converted) => converted,
                    None => {
                        warn!("No broker FX rate on cash flow {}", tx.id);
                        warnings.push(format!(
                            "Cash flow {} kept in {} (no broker FX rate)",
                            tx.id, tx.currency
                        ));
                        gross
                    }
                }
            };
            let signed = if tx.kind == crate::transactions::TransactionType::Withdrawal {
                -amount.abs()
            } else {
                amount.abs()
            };
            flows.push(CashFlow {
                date: tx.date,
                amount: signed,
            });
        }
        flows
    }

    fn compare(
        &self,
        benchmark_id: &str,
        series: &[SeriesPoint],
        flows_by_date: &BTreeMap<NaiveDate, Decimal>,
        risk_free: Decimal,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<super::performance_model::BenchmarkComparison> {
        let values = self.benchmark_series.get_daily_values(benchmark_id, start, end)?;
        if values.is_empty() {
            return Err(Error::BenchmarkUnavailable(format!(
                "{} has no values in {}..{}",
                benchmark_id, start, end
            )));
        }

        let benchmark_points: Vec<SeriesPoint> = values
            .iter()
            .map(|v| SeriesPoint::new(v.date, v.value))
            .collect();
        let no_flows = BTreeMap::new();
        let benchmark_returns = daily_returns(&benchmark_points, &no_flows);
        let portfolio_returns = daily_returns(series, flows_by_date);

        Ok(compare_to_benchmark(
            benchmark_id,
            &portfolio_returns,
            &benchmark_returns,
            risk_free,
        ))
    }
}

fn build_performance(
    start: NaiveDate,
    end: NaiveDate,
    series: &[SeriesPoint],
    external_flows: &[CashFlow],
    flows_by_date: &BTreeMap<NaiveDate, Decimal>,
) -> PerformanceSummary {
    let first = series.first();
    let last = series.last();

    let mut summary = PerformanceSummary {
        period_start: start,
        period_end: end,
        start_value: first.map(|p| p.value),
        end_value: last.map(|p| p.value),
        simple_return: None,
        time_weighted_return: None,
        annualized_return: None,
        money_weighted_return: None,
        money_weighted_failure: None,
    };
    let (Some(first), Some(last)) = (first, last) else {
        summary.money_weighted_failure = Some("Empty value series".to_string());
        return summary;
    };
    summary.simple_return = simple_return(first.value, last.value);
    summary.time_weighted_return = time_weighted_return(series, flows_by_date);
    summary.annualized_return = annualized_return(
        first.value,
        last.value,
        (last.date - first.date).num_days(),
    );
    if first.date == last.date {
        summary.money_weighted_failure = Some("Single-day value series".to_string());
        return summary;
    }

    // Investor-signed XIRR flows: the opening value is an outflow, later
    // deposits are outflows, withdrawals and the closing value inflows.
    // Flows dated on the opening day are already inside the opening value.
    let mut xirr_flows = vec![CashFlow {
        date: first.date,
        amount: -first.value,
    }];
    for flow in external_flows {
        if flow.date > first.date && flow.date <= last.date {
            xirr_flows.push(CashFlow {
                date: flow.date,
                amount: -flow.amount,
            });
        }
    }
    xirr_flows.push(CashFlow {
        date: last.date,
        amount: last.value,
    });
    let outcome = xirr(&xirr_flows);
    summary.money_weighted_return = outcome.rate;
    summary.money_weighted_failure = outcome.failure;
    summary
}
