//! Property tests for weighted-average-cost position accounting.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use folio_core::portfolio::holdings::{is_quantity_significant, HoldingsCalculator};
use folio_core::transactions::{Transaction, TransactionType};

#[derive(Debug, Clone)]
enum Op {
    Buy { quantity: u32, price: u32, fee: u32 },
    Sell { quantity: u32, price: u32, fee: u32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..500, 1u32..2000, 0u32..20)
            .prop_map(|(quantity, price, fee)| Op::Buy { quantity, price, fee }),
        (1u32..500, 1u32..2000, 0u32..20)
            .prop_map(|(quantity, price, fee)| Op::Sell { quantity, price, fee }),
    ]
}

fn to_transactions(ops: &[Op]) -> Vec<Transaction> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    ops.iter()
        .enumerate()
        .map(|(i, op)| {
            let (kind, quantity, price, fee) = match op {
                Op::Buy { quantity, price, fee } => {
                    (TransactionType::Buy, *quantity, *price, *fee)
                }
                Op::Sell { quantity, price, fee } => {
                    (TransactionType::Sell, *quantity, *price, *fee)
                }
            };
            Transaction {
                id: format!("tx{}", i),
                portfolio_id: "P1".to_string(),
                asset_id: Some("AAPL".to_string()),
                kind,
                date: start + Duration::days(i as i64),
                sequence: i as i64 + 1,
                quantity: Some(Decimal::from(quantity)),
                unit_price: Some(Decimal::from(price)),
                amount: None,
                currency: "USD".to_string(),
                fee: Some(Decimal::from(fee)),
                fee_currency: None,
                fx_rate: None,
                metadata: None,
            }
        })
        .collect()
}

proptest! {
    /// Over any BUY/SELL sequence the cost basis stays non-negative and
    /// zeroes out exactly when the position closes, and a sell never
    /// moves the average cost of what remains.
    #[test]
    fn cost_basis_is_non_negative_and_zero_iff_flat(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let transactions = to_transactions(&ops);
        let calculator = HoldingsCalculator::new("USD");
        let state = calculator.aggregate("P1", &transactions);

        for position in state.positions.values() {
            prop_assert!(position.quantity >= Decimal::ZERO);
            prop_assert!(position.total_cost_basis >= Decimal::ZERO);
            if !is_quantity_significant(&position.quantity) {
                prop_assert_eq!(position.total_cost_basis, Decimal::ZERO);
                prop_assert_eq!(position.average_cost, Decimal::ZERO);
            } else {
                let implied = position.average_cost * position.quantity;
                let drift = (implied - position.total_cost_basis).abs();
                prop_assert!(drift < Decimal::new(1, 6), "basis drift {}", drift);
            }
        }
    }

    /// Replaying a prefix of the ledger then the rest gives the same
    /// positions as replaying everything at once; the aggregation is a
    /// pure fold over the ordered ledger.
    #[test]
    fn aggregation_is_a_fold(ops in prop::collection::vec(op_strategy(), 2..30), split in 1usize..29) {
        let transactions = to_transactions(&ops);
        let split = split.min(transactions.len() - 1);
        let calculator = HoldingsCalculator::new("USD");

        let full = calculator.aggregate("P1", &transactions);

        let mut resumed = calculator.aggregate("P1", &transactions[..split]);
        for tx in &transactions[split..] {
            calculator.apply_transaction(&mut resumed, tx);
        }

        prop_assert_eq!(full.positions, resumed.positions);
        prop_assert_eq!(full.cash_balances, resumed.cash_balances);
    }
}
