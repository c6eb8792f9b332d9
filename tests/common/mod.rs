#![allow(dead_code)]

use chrono::NaiveDate;
use polypay::domain::methods::paypal::FundingSource;
use polypay::domain::payment::Payment;
use polypay::infrastructure::sinks::RecordingSink;
use rust_decimal::Decimal;
use std::sync::Arc;

pub const WALLET: &str = "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2";
pub const ORDER_HEADER: &str =
    "method,amount,card_number,cardholder,expiration,cvv,email,funding,tendered,currency,wallet,rate";

pub fn far_future() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 12, 31).unwrap()
}

pub fn long_ago() -> NaiveDate {
    NaiveDate::from_ymd_opt(2001, 1, 31).unwrap()
}

pub fn card(amount: Decimal) -> Payment {
    Payment::credit_card(amount, "4111111111111111", "Ada Lovelace", far_future(), "123")
        .expect("valid card payment")
}

pub fn paypal(amount: Decimal) -> Payment {
    Payment::paypal(amount, "ada@example.com", FundingSource::Balance).expect("valid paypal payment")
}

pub fn cash(amount: Decimal, tendered: Decimal) -> Payment {
    Payment::cash(amount, tendered).expect("valid cash payment")
}

pub fn bitcoin(amount: Decimal, rate: Decimal) -> Payment {
    Payment::bitcoin(amount, WALLET, rate).expect("valid bitcoin payment")
}

pub fn recorded(payment: Payment) -> (Payment, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    (payment.with_sink(sink.clone()), sink)
}
