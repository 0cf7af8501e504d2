use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::benchmark_calculator::{align_returns, compare_to_benchmark};

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn returns(points: &[(&str, Decimal)]) -> Vec<(NaiveDate, Decimal)> {
    points.iter().map(|(date, r)| (d(date), *r)).collect()
}

#[test]
fn alignment_drops_dates_missing_from_either_side() {
    // Portfolio trades Monday-Wednesday; the index is missing Tuesday
    // and adds a Thursday the portfolio lacks.
    let portfolio = returns(&[
        ("2024-01-01", dec!(0.01)),
        ("2024-01-02", dec!(0.02)),
        ("2024-01-03", dec!(0.03)),
    ]);
    let benchmark = returns(&[
        ("2024-01-01", dec!(0.005)),
        ("2024-01-03", dec!(0.015)),
        ("2024-01-04", dec!(0.025)),
    ]);

    let pairs = align_returns(&portfolio, &benchmark);
    assert_eq!(
        pairs,
        vec![(dec!(0.01), dec!(0.005)), (dec!(0.03), dec!(0.015))]
    );
}

#[test]
fn perfectly_tracking_portfolio_has_beta_one_and_zero_tracking_error() {
    let moves = [
        ("2024-01-01", dec!(0.01)),
        ("2024-01-02", dec!(-0.02)),
        ("2024-01-03", dec!(0.015)),
        ("2024-01-04", dec!(0.005)),
    ];
    let portfolio = returns(&moves);
    let benchmark = returns(&moves);

    let comparison = compare_to_benchmark("SPX", &portfolio, &benchmark, dec!(0));

    assert_eq!(comparison.aligned_points, 4);
    assert_eq!(comparison.beta, Some(dec!(1)));
    assert_eq!(comparison.alpha, Some(dec!(0)));
    assert_eq!(comparison.correlation, Some(dec!(1)));
    assert_eq!(comparison.tracking_error, Some(dec!(0)));
    // Zero tracking error leaves the information ratio undefined.
    assert_eq!(comparison.information_ratio, None);
    assert!(comparison.warnings.is_empty());
}

#[test]
fn leveraged_portfolio_has_beta_two() {
    let benchmark = returns(&[
        ("2024-01-01", dec!(0.01)),
        ("2024-01-02", dec!(-0.02)),
        ("2024-01-03", dec!(0.03)),
    ]);
    let portfolio: Vec<(NaiveDate, Decimal)> = benchmark
        .iter()
        .map(|(date, r)| (*date, *r * dec!(2)))
        .collect();

    let comparison = compare_to_benchmark("SPX", &portfolio, &benchmark, dec!(0));
    assert_eq!(comparison.beta, Some(dec!(2)));
    assert_eq!(comparison.correlation, Some(dec!(1)));
}

#[test]
fn constant_outperformance_shows_in_the_information_ratio() {
    let benchmark = returns(&[
        ("2024-01-01", dec!(0.01)),
        ("2024-01-02", dec!(-0.01)),
        ("2024-01-03", dec!(0.02)),
        ("2024-01-04", dec!(0.00)),
    ]);
    // Same moves shifted by a varying spread, mostly positive.
    let spreads = [dec!(0.002), dec!(0.001), dec!(0.003), dec!(0.002)];
    let portfolio: Vec<(NaiveDate, Decimal)> = benchmark
        .iter()
        .zip(spreads)
        .map(|((date, r), spread)| (*date, *r + spread))
        .collect();

    let comparison = compare_to_benchmark("SPX", &portfolio, &benchmark, dec!(0));
    let ir = comparison.information_ratio.unwrap();
    assert!(ir > dec!(0), "ir={}", ir);
    let te = comparison.tracking_error.unwrap();
    assert!(te > dec!(0));
}

#[test]
fn too_few_aligned_points_yields_absent_fields_and_a_warning() {
    let portfolio = returns(&[("2024-01-01", dec!(0.01))]);
    let benchmark = returns(&[("2024-01-01", dec!(0.005))]);

    let comparison = compare_to_benchmark("SPX", &portfolio, &benchmark, dec!(0));
    assert_eq!(comparison.aligned_points, 1);
    assert_eq!(comparison.beta, None);
    assert_eq!(comparison.correlation, None);
    assert_eq!(comparison.warnings.len(), 1);
}
