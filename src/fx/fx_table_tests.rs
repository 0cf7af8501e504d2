use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::fx_model::{convert_with_broker_rate, FxRatePoint};
use super::fx_table::FxRateTable;
use crate::constants::DECIMAL_PRECISION;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn table() -> FxRateTable {
    FxRateTable::new(vec![
        FxRatePoint::new("USD", "EUR", d("2024-05-03"), dec!(0.92)),
        FxRatePoint::new("USD", "EUR", d("2024-05-06"), dec!(0.93)),
        FxRatePoint::new("GBP", "EUR", d("2024-05-06"), dec!(1.17)),
    ])
}

#[test]
fn exact_date_hit() {
    let rate = table().get_rate("USD", "EUR", d("2024-05-06"), 7).unwrap();
    assert_eq!(rate, dec!(0.93));
}

#[test]
fn falls_back_over_a_weekend() {
    // 2024-05-05 is a Sunday; nearest earlier observation is Friday the 3rd.
    let rate = table().get_rate("USD", "EUR", d("2024-05-05"), 7).unwrap();
    assert_eq!(rate, dec!(0.92));
}

#[test]
fn fallback_is_bounded_by_the_window() {
    let err = table().get_rate("USD", "EUR", d("2024-05-20"), 7);
    assert!(err.is_err());
}

#[test]
fn inverse_pair_is_materialized() {
    let rate = table().get_rate("EUR", "USD", d("2024-05-06"), 7).unwrap();
    assert_eq!(rate, Decimal::ONE / dec!(0.93));
}

#[test]
fn identity_pair_is_one() {
    let rate = table().get_rate("EUR", "EUR", d("2024-05-06"), 0).unwrap();
    assert_eq!(rate, Decimal::ONE);
}

#[test]
fn currency_round_trip_within_precision() {
    let t = table();
    let amount = dec!(1234.56789);
    let eur = t.convert(amount, "USD", "EUR", d("2024-05-06"), 7).unwrap();
    let back = t.convert(eur, "EUR", "USD", d("2024-05-06"), 7).unwrap();
    assert_eq!(
        back.round_dp(DECIMAL_PRECISION),
        amount.round_dp(DECIMAL_PRECISION)
    );
}

#[test]
fn broker_rate_convention_is_the_inverse_of_the_service_rate() {
    // Service convention: 1 USD = 0.93 EUR. Broker convention for a USD
    // portfolio trading in EUR: 1 USD = 0.93 EUR as well, so an EUR amount
    // divides by the broker rate while the service rate multiplies.
    let eur_amount = dec!(93);
    let via_broker = convert_with_broker_rate(eur_amount, Some(dec!(0.93))).unwrap();
    let via_service = table()
        .convert(eur_amount, "EUR", "USD", d("2024-05-06"), 7)
        .unwrap();
    assert_eq!(via_broker.round_dp(6), via_service.round_dp(6));
}

#[test]
fn broker_rate_absent_or_zero_yields_none() {
    assert!(convert_with_broker_rate(dec!(1), None).is_none());
    assert!(convert_with_broker_rate(dec!(1), Some(dec!(0))).is_none());
}
