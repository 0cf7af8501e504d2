use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use super::performance_model::SeriesPoint;
use super::risk_calculator::{
    annualized_volatility, calculate_risk, drawdown_periods, sharpe_ratio, sortino_ratio,
    value_at_risk,
};

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn series(points: &[(&str, Decimal)]) -> Vec<SeriesPoint> {
    points
        .iter()
        .map(|(date, value)| SeriesPoint::new(d(date), *value))
        .collect()
}

#[test]
fn volatility_annualizes_the_sample_stdev() {
    // Returns +1% / -1% alternating: mean 0, sample stdev of
    // [0.01, -0.01, 0.01, -0.01] = sqrt(4 * 0.0001 / 3).
    let daily = vec![dec!(0.01), dec!(-0.01), dec!(0.01), dec!(-0.01)];
    let expected_sd = (dec!(0.0004) / dec!(3)).sqrt().unwrap();
    let expected = (expected_sd * dec!(252).sqrt().unwrap()).round_dp(8);

    assert_eq!(annualized_volatility(&daily), Some(expected));
}

#[test]
fn volatility_needs_two_observations() {
    assert_eq!(annualized_volatility(&[dec!(0.01)]), None);
    assert_eq!(annualized_volatility(&[]), None);
}

#[test]
fn sharpe_uses_daily_excess_over_the_deannualized_rate() {
    let daily = vec![dec!(0.001), dec!(0.002), dec!(0.001), dec!(0.002)];
    let with_zero_rf = sharpe_ratio(&daily, dec!(0)).unwrap();
    let with_high_rf = sharpe_ratio(&daily, dec!(0.05)).unwrap();
    // A higher risk-free rate can only lower the ratio.
    assert!(with_high_rf < with_zero_rf);
    assert!(with_zero_rf > dec!(0));
}

#[test]
fn sortino_is_absent_without_enough_losing_days() {
    let all_gains = vec![dec!(0.01), dec!(0.02), dec!(0.01)];
    assert_eq!(sortino_ratio(&all_gains, dec!(0)), None);

    let mixed = vec![dec!(0.02), dec!(-0.01), dec!(0.03), dec!(-0.02)];
    let sortino = sortino_ratio(&mixed, dec!(0)).unwrap();
    let sharpe = sharpe_ratio(&mixed, dec!(0)).unwrap();
    // Downside deviation over two mild losses is smaller than full
    // dispersion here, so Sortino comes out higher.
    assert!(sortino > sharpe);
}

#[test]
fn drawdowns_track_peak_trough_and_recovery() {
    let series = series(&[
        ("2024-01-01", dec!(100)),
        ("2024-01-02", dec!(110)), // peak A
        ("2024-01-03", dec!(99)),  // trough A: -10%
        ("2024-01-04", dec!(115)), // recovers, new peak B
        ("2024-01-05", dec!(92)),  // trough B: -20%, never recovers
    ]);

    let periods = drawdown_periods(&series);
    assert_eq!(periods.len(), 2);

    // Deepest first.
    assert_eq!(periods[0].peak_date, d("2024-01-04"));
    assert_eq!(periods[0].trough_date, d("2024-01-05"));
    assert_eq!(periods[0].depth, dec!(0.2));
    assert_eq!(periods[0].recovery_date, None);

    assert_eq!(periods[1].peak_date, d("2024-01-02"));
    assert_eq!(periods[1].trough_date, d("2024-01-03"));
    assert_eq!(periods[1].depth, dec!(0.1));
    assert_eq!(periods[1].recovery_date, Some(d("2024-01-04")));
}

#[test]
fn drawdowns_keep_only_the_five_deepest() {
    // Six saw-tooth drawdowns of increasing depth.
    let mut points: Vec<(String, Decimal)> = Vec::new();
    let mut day = 1;
    for depth in 1..=6u32 {
        points.push((format!("2024-01-{:02}", day), dec!(1000)));
        day += 1;
        points.push((
            format!("2024-01-{:02}", day),
            dec!(1000) - Decimal::from(depth * 10),
        ));
        day += 1;
    }
    let series: Vec<SeriesPoint> = points
        .iter()
        .map(|(date, value)| SeriesPoint::new(date.parse().unwrap(), *value))
        .collect();

    let periods = drawdown_periods(&series);
    assert_eq!(periods.len(), 5);
    assert_eq!(periods[0].depth, dec!(0.06));
    // The shallowest (1%) episode fell off the list.
    assert!(periods.iter().all(|p| p.depth > dec!(0.01)));
}

#[test]
fn var_is_the_tail_quantile_as_a_positive_loss() {
    // 20 returns: -0.05 is the single worst; at 95% confidence the
    // cutoff index is (1 - 0.95) * 20 = 1, the second worst.
    let mut daily = vec![dec!(-0.05), dec!(-0.03)];
    daily.extend(std::iter::repeat(dec!(0.001)).take(18));

    assert_eq!(value_at_risk(&daily, dec!(0.95)), Some(dec!(0.03)));
    assert_eq!(value_at_risk(&[], dec!(0.95)), None);
}

#[test]
fn risk_block_assembles_all_statistics() {
    let series = series(&[
        ("2024-01-01", dec!(1000)),
        ("2024-01-02", dec!(1010)),
        ("2024-01-03", dec!(990)),
        ("2024-01-04", dec!(1030)),
        ("2024-01-05", dec!(1020)),
    ]);
    let no_flows = BTreeMap::new();

    let risk = calculate_risk(&series, &no_flows, dec!(0), dec!(0.95));

    assert!(risk.volatility.is_some());
    assert!(risk.sharpe_ratio.is_some());
    assert!(risk.max_drawdown.is_some());
    assert!(!risk.drawdown_periods.is_empty());
    assert!(risk.value_at_risk.is_some());
    assert_eq!(risk.var_confidence, dec!(0.95));
}
