use polypay::domain::payment::Payment;
use polypay::domain::status::PaymentStatus;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

mod common;

fn all_methods() -> Vec<Payment> {
    vec![
        common::card(dec!(100)),
        common::paypal(dec!(100)),
        common::cash(dec!(100), dec!(150)),
        common::bitcoin(dec!(100), dec!(50000)),
    ]
}

#[test]
fn test_same_call_completes_every_method() {
    let mut payments = all_methods();
    for payment in payments.iter_mut() {
        assert!(payment.process(), "{} did not complete", payment.payment_method());
    }
    assert!(payments
        .iter()
        .all(|p| p.status() == PaymentStatus::Completed));
}

#[test]
fn test_fee_percentages_differ_by_method() {
    let rates: Vec<Decimal> = all_methods()
        .iter()
        .map(Payment::transaction_fee_percentage)
        .collect();
    assert_eq!(rates, vec![dec!(2.9), dec!(3.5), dec!(0), dec!(0.5)]);

    let distinct: HashSet<Decimal> = rates.into_iter().collect();
    assert_eq!(distinct.len(), 4);
}

#[test]
fn test_totals_differ_by_method() {
    let totals: Vec<Decimal> = all_methods().iter().map(Payment::total_amount).collect();
    assert_eq!(
        totals,
        vec![dec!(102.90), dec!(103.80), dec!(100), dec!(100.50)]
    );
}

#[test]
fn test_method_names_and_descriptions() {
    let mut payments = all_methods();
    for payment in payments.iter_mut() {
        payment.process();
    }

    let names: Vec<&str> = payments.iter().map(Payment::payment_method).collect();
    assert_eq!(names, vec!["Credit Card", "PayPal", "Cash", "Bitcoin"]);

    assert!(payments[0].describe().contains("**** **** **** 1111"));
    assert!(payments[1].describe().contains("Authorization token: EC-"));
    assert!(payments[2].describe().contains("Change: 50.00"));
    assert!(payments[3].describe().contains("Confirmations: 3/3"));
}
