//! The closed set of payment methods.
//!
//! Each variant struct owns the method-specific state and rules;
//! [`PaymentMethod`] dispatches the shared contract to them with an
//! exhaustive `match`.

pub mod bitcoin;
pub mod cash;
pub mod credit_card;
pub mod paypal;

use self::bitcoin::BitcoinPayment;
use self::cash::CashPayment;
use self::credit_card::CreditCardPayment;
use self::paypal::PayPalPayment;
use super::events::PaymentEvent;
use super::money::TransactionId;
use super::ports::EventSink;
use crate::error::{Refusal, ValidationError};
use crate::policy::PaymentPolicy;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Emits events on behalf of one payment.
pub struct Narrator<'a> {
    transaction_id: &'a TransactionId,
    sink: &'a dyn EventSink,
}

impl<'a> Narrator<'a> {
    pub fn new(transaction_id: &'a TransactionId, sink: &'a dyn EventSink) -> Self {
        Self {
            transaction_id,
            sink,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        self.transaction_id
    }

    pub fn emit(&self, event: PaymentEvent) {
        self.sink.on_event(self.transaction_id, &event);
    }
}

/// Result of a method's processing step once validation has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Broadcast but not yet confirmed; the payment stays `Processing`.
    AwaitingConfirmations,
}

#[derive(Debug)]
pub enum PaymentMethod {
    CreditCard(CreditCardPayment),
    PayPal(PayPalPayment),
    Cash(CashPayment),
    Bitcoin(BitcoinPayment),
}

impl PaymentMethod {
    pub fn name(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard(_) => "Credit Card",
            PaymentMethod::PayPal(_) => "PayPal",
            PaymentMethod::Cash(_) => "Cash",
            PaymentMethod::Bitcoin(_) => "Bitcoin",
        }
    }

    pub fn fee_percentage(&self, policy: &PaymentPolicy) -> Decimal {
        match self {
            PaymentMethod::CreditCard(_) => policy.credit_card_fee_percentage,
            PaymentMethod::PayPal(_) => policy.paypal_fee_percentage,
            PaymentMethod::Cash(_) => policy.cash_fee_percentage,
            PaymentMethod::Bitcoin(_) => policy.bitcoin_fee_percentage,
        }
    }

    pub fn fixed_fee(&self, policy: &PaymentPolicy) -> Decimal {
        match self {
            PaymentMethod::PayPal(_) => policy.paypal_fixed_fee,
            _ => Decimal::ZERO,
        }
    }

    pub(crate) fn check(
        &self,
        amount: Decimal,
        policy: &PaymentPolicy,
        today: NaiveDate,
    ) -> Result<(), ValidationError> {
        match self {
            PaymentMethod::CreditCard(card) => card.check(today),
            PaymentMethod::PayPal(paypal) => paypal.check(amount, policy),
            PaymentMethod::Cash(cash) => cash.check(amount, policy),
            PaymentMethod::Bitcoin(btc) => btc.check(),
        }
    }

    pub(crate) fn execute(
        &mut self,
        policy: &PaymentPolicy,
        narrator: &Narrator<'_>,
    ) -> StepOutcome {
        match self {
            PaymentMethod::CreditCard(card) => card.authorize(narrator),
            PaymentMethod::PayPal(paypal) => paypal.authorize(narrator),
            PaymentMethod::Cash(cash) => cash.accept(narrator),
            PaymentMethod::Bitcoin(btc) => btc.broadcast_and_confirm(policy, narrator),
        }
    }

    /// Method-specific side of a refund that already passed the shared rules.
    /// Returns the note attached to the refund.
    pub(crate) fn refund(&mut self, amount: Decimal) -> String {
        match self {
            PaymentMethod::CreditCard(_) => {
                "credited back to the card within 3-5 business days".to_string()
            }
            PaymentMethod::PayPal(_) => "available instantly in the PayPal balance".to_string(),
            PaymentMethod::Cash(cash) => cash.refund_note(amount),
            PaymentMethod::Bitcoin(btc) => btc.send_refund(amount),
        }
    }

    pub(crate) fn cancel_guard(&self) -> Result<(), Refusal> {
        match self {
            PaymentMethod::Bitcoin(btc) if btc.is_confirmed() => Err(Refusal::ConfirmedOnChain),
            _ => Ok(()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PaymentMethod::CreditCard(card) => card.describe(),
            PaymentMethod::PayPal(paypal) => paypal.describe(),
            PaymentMethod::Cash(cash) => cash.describe(),
            PaymentMethod::Bitcoin(btc) => btc.describe(),
        }
    }

    pub fn as_credit_card(&self) -> Option<&CreditCardPayment> {
        match self {
            PaymentMethod::CreditCard(card) => Some(card),
            _ => None,
        }
    }

    pub fn as_paypal(&self) -> Option<&PayPalPayment> {
        match self {
            PaymentMethod::PayPal(paypal) => Some(paypal),
            _ => None,
        }
    }

    pub fn as_cash(&self) -> Option<&CashPayment> {
        match self {
            PaymentMethod::Cash(cash) => Some(cash),
            _ => None,
        }
    }

    pub fn as_bitcoin(&self) -> Option<&BitcoinPayment> {
        match self {
            PaymentMethod::Bitcoin(btc) => Some(btc),
            _ => None,
        }
    }

    pub(crate) fn as_bitcoin_mut(&mut self) -> Option<&mut BitcoinPayment> {
        match self {
            PaymentMethod::Bitcoin(btc) => Some(btc),
            _ => None,
        }
    }
}
