use crate::domain::methods::cash::DEFAULT_CURRENCY;
use crate::domain::methods::paypal::FundingSource;
use crate::domain::payment::Payment;
use crate::error::{PaymentError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    CreditCard,
    #[serde(rename = "paypal")]
    PayPal,
    Cash,
    Bitcoin,
}

impl MethodKind {
    fn label(self) -> &'static str {
        match self {
            MethodKind::CreditCard => "credit card",
            MethodKind::PayPal => "PayPal",
            MethodKind::Cash => "cash",
            MethodKind::Bitcoin => "bitcoin",
        }
    }
}

/// A request to create one payment.
///
/// Only the fields relevant to `method` are read; the rest may be empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PaymentOrder {
    pub method: MethodKind,
    pub amount: Decimal,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub cardholder: Option<String>,
    #[serde(default)]
    pub expiration: Option<NaiveDate>,
    #[serde(default)]
    pub cvv: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub funding: Option<FundingSource>,
    #[serde(default)]
    pub tendered: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub wallet: Option<String>,
    #[serde(default)]
    pub rate: Option<Decimal>,
}

impl PaymentOrder {
    /// Builds the payment described by this order. The payment is left pending.
    pub fn into_payment(self) -> Result<Payment> {
        let method = self.method;
        let required = |field: &'static str| PaymentError::MissingField {
            method: method.label(),
            field,
        };

        match method {
            MethodKind::CreditCard => Payment::credit_card(
                self.amount,
                &self.card_number.ok_or_else(|| required("card_number"))?,
                self.cardholder.unwrap_or_default(),
                self.expiration.ok_or_else(|| required("expiration"))?,
                self.cvv.ok_or_else(|| required("cvv"))?,
            ),
            MethodKind::PayPal => Payment::paypal(
                self.amount,
                self.email.ok_or_else(|| required("email"))?,
                self.funding.unwrap_or_default(),
            ),
            MethodKind::Cash => Payment::cash_in(
                self.amount,
                self.tendered.unwrap_or(self.amount),
                self.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            ),
            MethodKind::Bitcoin => Payment::bitcoin(
                self.amount,
                self.wallet.ok_or_else(|| required("wallet"))?,
                self.rate.ok_or_else(|| required("rate"))?,
            ),
        }
    }
}
