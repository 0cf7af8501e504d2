use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::performance_service::PerformanceService;
use crate::benchmarks::{BenchmarkSeriesTrait, BenchmarkValue};
use crate::errors::{Error, Result};
use crate::portfolio::history::{
    HistoryInterval, HistoryServiceTrait, PortfolioHistory,
};
use crate::portfolio::holdings::HoldingPosition;
use crate::portfolio::valuation::{HoldingValuation, ValuationSnapshot};
use crate::settings::ValuationSettings;
use crate::transactions::{Transaction, TransactionRepositoryTrait, TransactionType};

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn snapshot(date: &str, total_value: Option<Decimal>) -> ValuationSnapshot {
    ValuationSnapshot {
        portfolio_id: "P1".to_string(),
        date: d(date),
        currency: "USD".to_string(),
        total_value,
        total_cash: None,
        is_cash_tracked: false,
        total_cost_basis: Decimal::ZERO,
        unrealized_gain: total_value.map(|_| Decimal::ZERO),
        realized_gain: Decimal::ZERO,
        total_gain: total_value.map(|_| Decimal::ZERO),
        is_complete: total_value.is_some(),
        warnings: Vec::new(),
        synthetic_assets: Vec::new(),
        synthetic_ratio: Decimal::ZERO,
    }
}

/// Serves a fixed daily series and counts how often it is asked.
struct FixedHistory {
    points: Vec<ValuationSnapshot>,
    calls: AtomicUsize,
}

impl FixedHistory {
    fn new(points: Vec<ValuationSnapshot>) -> Arc<Self> {
        Arc::new(FixedHistory {
            points,
            calls: AtomicUsize::new(0),
        })
    }
}

impl HistoryServiceTrait for FixedHistory {
    fn get_history(
        &self,
        portfolio_id: &str,
        _start: NaiveDate,
        _end: NaiveDate,
        interval: HistoryInterval,
    ) -> Result<PortfolioHistory> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(interval, HistoryInterval::Daily);
        Ok(PortfolioHistory {
            portfolio_id: portfolio_id.to_string(),
            interval,
            points: self.points.clone(),
            synthetic_usage: Vec::new(),
            transactions_applied: 0,
        })
    }

    fn get_valuation(&self, _portfolio_id: &str, _date: NaiveDate) -> Result<ValuationSnapshot> {
        unimplemented!("not used by the orchestrator")
    }

    fn get_holdings(&self, _portfolio_id: &str, _date: NaiveDate) -> Result<Vec<HoldingPosition>> {
        unimplemented!("not used by the orchestrator")
    }

    fn get_holdings_valued(
        &self,
        _portfolio_id: &str,
        _date: NaiveDate,
    ) -> Result<Vec<HoldingValuation>> {
        unimplemented!("not used by the orchestrator")
    }
}

struct FixedTransactions(Vec<Transaction>);

impl TransactionRepositoryTrait for FixedTransactions {
    fn get_transactions_up_to(
        &self,
        portfolio_id: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .0
            .iter()
            .filter(|tx| tx.portfolio_id == portfolio_id && tx.date <= as_of)
            .cloned()
            .collect())
    }
}

struct FixedBenchmark(Vec<BenchmarkValue>);

impl BenchmarkSeriesTrait for FixedBenchmark {
    fn get_daily_values(
        &self,
        benchmark_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkValue>> {
        Ok(self
            .0
            .iter()
            .filter(|v| v.benchmark_id == benchmark_id && v.date >= start && v.date <= end)
            .cloned()
            .collect())
    }
}

fn deposit(id: &str, date: &str, amount: Decimal) -> Transaction {
    Transaction {
        id: id.to_string(),
        portfolio_id: "P1".to_string(),
        asset_id: None,
        kind: TransactionType::Deposit,
        date: d(date),
        sequence: 1,
        quantity: None,
        unit_price: None,
        amount: Some(amount),
        currency: "USD".to_string(),
        fee: None,
        fee_currency: None,
        fx_rate: None,
        metadata: None,
    }
}

fn service(
    history: Arc<FixedHistory>,
    transactions: Vec<Transaction>,
    benchmark: Vec<BenchmarkValue>,
    settings: ValuationSettings,
) -> PerformanceService {
    PerformanceService::new(
        history,
        Arc::new(FixedTransactions(transactions)),
        Arc::new(FixedBenchmark(benchmark)),
        settings,
    )
}

#[test]
fn report_combines_returns_and_risk() {
    let history = FixedHistory::new(vec![
        snapshot("2024-01-01", Some(dec!(1000))),
        snapshot("2024-01-02", Some(dec!(1510))),
        snapshot("2024-01-03", Some(dec!(1525))),
    ]);
    let svc = service(
        history,
        vec![deposit("dep1", "2024-01-02", dec!(500))],
        Vec::new(),
        ValuationSettings::default(),
    );

    let report = svc
        .get_analytics("P1", d("2024-01-01"), d("2024-01-03"), None, None)
        .unwrap();

    assert_eq!(report.currency, "USD");
    assert_eq!(report.performance.start_value, Some(dec!(1000)));
    assert_eq!(report.performance.end_value, Some(dec!(1525)));
    // Day 2 grew 1% net of the 500 deposit, day 3 grew ~0.99%.
    let twr = report.performance.time_weighted_return.unwrap();
    assert!(twr > dec!(0.019) && twr < dec!(0.021), "twr={}", twr);
    // Simple return is deposit-inflated by comparison.
    assert_eq!(report.performance.simple_return, Some(dec!(0.525)));
    assert!(report.performance.money_weighted_return.is_some());
    assert!(report.risk.volatility.is_some());
    assert!(report.benchmark.is_none());
    assert!(report.warnings.is_empty());
}

#[test]
fn incomplete_days_are_excluded_with_a_warning() {
    let history = FixedHistory::new(vec![
        snapshot("2024-01-01", Some(dec!(1000))),
        snapshot("2024-01-02", None),
        snapshot("2024-01-03", Some(dec!(1020))),
    ]);
    let svc = service(history, Vec::new(), Vec::new(), ValuationSettings::default());

    let report = svc
        .get_analytics("P1", d("2024-01-01"), d("2024-01-03"), None, None)
        .unwrap();

    assert_eq!(report.performance.simple_return, Some(dec!(0.02)));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("1 of 3"));
}

#[test]
fn deposit_on_an_excluded_day_is_not_counted_as_performance() {
    // Day two has no usable valuation and is dropped from the series,
    // but its deposit still happened. The gap-spanning window strips it:
    // (1520 - 500) / 1000 - 1 = 2%.
    let history = FixedHistory::new(vec![
        snapshot("2024-01-01", Some(dec!(1000))),
        snapshot("2024-01-02", None),
        snapshot("2024-01-03", Some(dec!(1520))),
    ]);
    let svc = service(
        history,
        vec![deposit("dep1", "2024-01-02", dec!(500))],
        Vec::new(),
        ValuationSettings::default(),
    );

    let report = svc
        .get_analytics("P1", d("2024-01-01"), d("2024-01-03"), None, None)
        .unwrap();

    assert_eq!(report.performance.time_weighted_return, Some(dec!(0.02)));
}

#[test]
fn missing_benchmark_series_is_a_distinct_error() {
    let history = FixedHistory::new(vec![
        snapshot("2024-01-01", Some(dec!(1000))),
        snapshot("2024-01-02", Some(dec!(1010))),
    ]);
    let svc = service(history, Vec::new(), Vec::new(), ValuationSettings::default());

    let result = svc.get_analytics("P1", d("2024-01-01"), d("2024-01-02"), Some("SPX"), None);
    assert!(matches!(result, Err(Error::BenchmarkUnavailable(_))));
}

#[test]
fn benchmark_comparison_is_attached_when_values_exist() {
    let history = FixedHistory::new(vec![
        snapshot("2024-01-01", Some(dec!(1000))),
        snapshot("2024-01-02", Some(dec!(1010))),
        snapshot("2024-01-03", Some(dec!(1005))),
    ]);
    let benchmark = vec![
        BenchmarkValue {
            benchmark_id: "SPX".to_string(),
            date: d("2024-01-01"),
            value: dec!(5000),
        },
        BenchmarkValue {
            benchmark_id: "SPX".to_string(),
            date: d("2024-01-02"),
            value: dec!(5050),
        },
        BenchmarkValue {
            benchmark_id: "SPX".to_string(),
            date: d("2024-01-03"),
            value: dec!(5025),
        },
    ];
    let svc = service(history, Vec::new(), benchmark, ValuationSettings::default());

    let report = svc
        .get_analytics("P1", d("2024-01-01"), d("2024-01-03"), Some("SPX"), None)
        .unwrap();

    let comparison = report.benchmark.unwrap();
    assert_eq!(comparison.benchmark_id, "SPX");
    assert_eq!(comparison.aligned_points, 2);
    assert!(comparison.beta.is_some());
}

#[test]
fn reports_are_cached_until_cleared() {
    let history = FixedHistory::new(vec![
        snapshot("2024-01-01", Some(dec!(1000))),
        snapshot("2024-01-02", Some(dec!(1010))),
    ]);
    let counter = Arc::clone(&history);
    let svc = service(history, Vec::new(), Vec::new(), ValuationSettings::default());

    let first = svc
        .get_analytics("P1", d("2024-01-01"), d("2024-01-02"), None, None)
        .unwrap();
    let second = svc
        .get_analytics("P1", d("2024-01-01"), d("2024-01-02"), None, None)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(counter.calls.load(Ordering::SeqCst), 1);

    svc.clear_cache();
    svc.get_analytics("P1", d("2024-01-01"), d("2024-01-02"), None, None)
        .unwrap();
    assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn zero_ttl_disables_caching() {
    let history = FixedHistory::new(vec![
        snapshot("2024-01-01", Some(dec!(1000))),
        snapshot("2024-01-02", Some(dec!(1010))),
    ]);
    let counter = Arc::clone(&history);
    let settings = ValuationSettings {
        analytics_cache_ttl: Duration::ZERO,
        ..ValuationSettings::default()
    };
    let svc = service(history, Vec::new(), Vec::new(), settings);

    for _ in 0..3 {
        svc.get_analytics("P1", d("2024-01-01"), d("2024-01-02"), None, None)
            .unwrap();
    }
    assert_eq!(counter.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn a_different_risk_free_rate_is_a_different_cache_entry() {
    let history = FixedHistory::new(vec![
        snapshot("2024-01-01", Some(dec!(1000))),
        snapshot("2024-01-02", Some(dec!(1010))),
    ]);
    let counter = Arc::clone(&history);
    let svc = service(history, Vec::new(), Vec::new(), ValuationSettings::default());

    svc.get_analytics("P1", d("2024-01-01"), d("2024-01-02"), None, Some(dec!(0.02)))
        .unwrap();
    svc.get_analytics("P1", d("2024-01-01"), d("2024-01-02"), None, Some(dec!(0.05)))
        .unwrap();
    assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
}
