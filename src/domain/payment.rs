use super::events::PaymentEvent;
use super::methods::bitcoin::BitcoinPayment;
use super::methods::cash::{CashPayment, DEFAULT_CURRENCY};
use super::methods::credit_card::CreditCardPayment;
use super::methods::paypal::{FundingSource, PayPalPayment};
use super::methods::{Narrator, PaymentMethod, StepOutcome};
use super::money::{Amount, TransactionId, serialize_cents, to_cents};
use super::ports::EventSinkRef;
use super::status::PaymentStatus;
use crate::error::{Refusal, Result, ValidationError};
use crate::infrastructure::sinks::TracingSink;
use crate::policy::PaymentPolicy;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A single payment transaction.
///
/// Holds the state every payment method shares (identity, amount, status,
/// timestamps) and enforces the lifecycle rules. Method-specific behaviour is
/// delegated to [`PaymentMethod`].
///
/// Business outcomes are reported as `bool` (or `Option`) returns; the reason
/// for a refusal is emitted to the attached event sink.
pub struct Payment {
    transaction_id: TransactionId,
    amount: Amount,
    status: PaymentStatus,
    payment_date: DateTime<Utc>,
    refunded_amount: Option<Decimal>,
    policy: PaymentPolicy,
    method: PaymentMethod,
    sink: EventSinkRef,
}

impl Payment {
    fn new(amount: Amount, method: PaymentMethod) -> Self {
        Self {
            transaction_id: TransactionId::generate(),
            amount,
            status: PaymentStatus::Pending,
            payment_date: Utc::now(),
            refunded_amount: None,
            policy: PaymentPolicy::default(),
            method,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn credit_card(
        amount: Decimal,
        card_number: &str,
        cardholder: impl Into<String>,
        expiration: NaiveDate,
        cvv: impl Into<String>,
    ) -> Result<Self> {
        let amount = Amount::new(amount)?;
        let card = CreditCardPayment::new(card_number, cardholder, expiration, cvv);
        Ok(Self::new(amount, PaymentMethod::CreditCard(card)))
    }

    pub fn paypal(
        amount: Decimal,
        email: impl Into<String>,
        funding_source: FundingSource,
    ) -> Result<Self> {
        let amount = Amount::new(amount)?;
        let paypal = PayPalPayment::new(email, funding_source)?;
        Ok(Self::new(amount, PaymentMethod::PayPal(paypal)))
    }

    pub fn cash(amount: Decimal, amount_tendered: Decimal) -> Result<Self> {
        Self::cash_in(amount, amount_tendered, DEFAULT_CURRENCY)
    }

    pub fn cash_in(
        amount: Decimal,
        amount_tendered: Decimal,
        currency: impl Into<String>,
    ) -> Result<Self> {
        let amount = Amount::new(amount)?;
        let cash = CashPayment::new(amount.value(), amount_tendered, currency)?;
        Ok(Self::new(amount, PaymentMethod::Cash(cash)))
    }

    pub fn bitcoin(
        amount: Decimal,
        wallet_address: impl Into<String>,
        exchange_rate: Decimal,
    ) -> Result<Self> {
        let amount = Amount::new(amount)?;
        let required = PaymentPolicy::default().required_confirmations;
        let btc = BitcoinPayment::new(amount.value(), wallet_address, exchange_rate, required)?;
        Ok(Self::new(amount, PaymentMethod::Bitcoin(btc)))
    }

    /// Replaces the default policy.
    pub fn with_policy(mut self, policy: PaymentPolicy) -> Self {
        if let Some(btc) = self.method.as_bitcoin_mut() {
            btc.set_required_confirmations(policy.required_confirmations);
        }
        self.policy = policy;
        self
    }

    /// Replaces the default [`TracingSink`].
    pub fn with_sink(mut self, sink: EventSinkRef) -> Self {
        self.sink = sink;
        self
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount.value()
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn payment_date(&self) -> DateTime<Utc> {
        self.payment_date
    }

    pub fn refunded_amount(&self) -> Option<Decimal> {
        self.refunded_amount
    }

    pub fn policy(&self) -> &PaymentPolicy {
        &self.policy
    }

    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    pub fn payment_method(&self) -> &'static str {
        self.method.name()
    }

    /// Fee rate in percent.
    pub fn transaction_fee_percentage(&self) -> Decimal {
        self.method.fee_percentage(&self.policy)
    }

    /// Saturates at `Decimal::MAX` for amounts near the top of the range.
    pub fn transaction_fee(&self) -> Decimal {
        let variable = self
            .amount
            .value()
            .saturating_mul(self.transaction_fee_percentage())
            / Decimal::ONE_HUNDRED;
        to_cents(variable.saturating_add(self.method.fixed_fee(&self.policy)))
    }

    pub fn total_amount(&self) -> Decimal {
        self.amount.value().saturating_add(self.transaction_fee())
    }

    /// Method-specific structural checks. Does not touch the status.
    pub fn validate(&self) -> bool {
        self.check().is_ok()
    }

    /// Like [`validate`](Self::validate), but returns the reason on failure.
    pub fn check(&self) -> std::result::Result<(), ValidationError> {
        self.method
            .check(self.amount.value(), &self.policy, Utc::now().date_naive())
    }

    /// Runs the payment from `Pending` to `Completed` or `Failed`.
    ///
    /// Only a pending payment can be processed; there is no in-place retry.
    /// A Bitcoin payment whose confirmations fall short stays `Processing`
    /// and this returns `false` even though its transaction was broadcast.
    pub fn process(&mut self) -> bool {
        if self.status != PaymentStatus::Pending {
            self.emit(PaymentEvent::ProcessSkipped(Refusal::NotPending(self.status)));
            return false;
        }
        self.transition(PaymentStatus::Processing);

        if let Err(reason) = self.check() {
            self.emit(PaymentEvent::ValidationFailed(reason));
            self.transition(PaymentStatus::Failed);
            return false;
        }

        let narrator = Narrator::new(&self.transaction_id, &*self.sink);
        let outcome = self.method.execute(&self.policy, &narrator);
        self.finish(outcome)
    }

    /// Polls for more confirmations on a broadcast Bitcoin payment that
    /// `process` left in `Processing`.
    pub fn await_confirmations(&mut self) -> bool {
        let awaiting = self.status == PaymentStatus::Processing
            && self.method.as_bitcoin().is_some_and(|btc| btc.is_broadcast());
        if !awaiting {
            self.emit(PaymentEvent::ProcessSkipped(Refusal::NotAwaitingConfirmations));
            return false;
        }

        let polls = self.policy.confirmation_polls;
        let narrator = Narrator::new(&self.transaction_id, &*self.sink);
        let outcome = match self.method.as_bitcoin_mut() {
            Some(btc) => btc.poll_confirmations(polls, &narrator),
            None => StepOutcome::AwaitingConfirmations,
        };
        self.finish(outcome)
    }

    fn finish(&mut self, outcome: StepOutcome) -> bool {
        match outcome {
            StepOutcome::Completed => {
                self.transition(PaymentStatus::Completed);
                true
            }
            StepOutcome::AwaitingConfirmations => false,
        }
    }

    /// Refunds `amount` of a completed payment.
    pub fn refund(&mut self, amount: Decimal) -> bool {
        if let Err(reason) = self.refund_guard(amount) {
            self.emit(PaymentEvent::RefundRefused(reason));
            return false;
        }

        let note = self.method.refund(amount);
        self.refunded_amount = Some(amount);
        self.emit(PaymentEvent::RefundIssued { amount, note });
        self.transition(PaymentStatus::Refunded);
        true
    }

    fn refund_guard(&self, amount: Decimal) -> std::result::Result<(), Refusal> {
        if self.status != PaymentStatus::Completed {
            return Err(Refusal::NotCompleted(self.status));
        }
        if amount <= Decimal::ZERO || amount > self.amount.value() {
            return Err(Refusal::InvalidRefundAmount {
                requested: amount,
                original: self.amount.value(),
            });
        }
        Ok(())
    }

    /// Cancels a payment that has not completed.
    pub fn cancel(&mut self) -> bool {
        if let Err(reason) = self.cancel_guard() {
            self.emit(PaymentEvent::CancelRefused(reason));
            return false;
        }
        self.transition(PaymentStatus::Cancelled);
        true
    }

    fn cancel_guard(&self) -> std::result::Result<(), Refusal> {
        self.method.cancel_guard()?;
        match self.status {
            PaymentStatus::Completed => Err(Refusal::AlreadyCompleted),
            status if status.is_final() => Err(Refusal::AlreadyFinal(status)),
            _ => Ok(()),
        }
    }

    /// Issues a receipt for a completed payment; anything else is skipped.
    pub fn send_receipt(&self, destination: &str) -> Option<Receipt> {
        if self.status != PaymentStatus::Completed {
            self.emit(PaymentEvent::ReceiptSkipped(self.status));
            return None;
        }

        let receipt = Receipt {
            transaction_id: self.transaction_id.clone(),
            destination: destination.to_string(),
            method: self.payment_method(),
            amount: self.amount.value(),
            fee: self.transaction_fee(),
            total: self.total_amount(),
            issued_at: Utc::now(),
        };
        self.emit(PaymentEvent::ReceiptSent {
            destination: receipt.destination.clone(),
        });
        Some(receipt)
    }

    /// Method-specific detail block.
    pub fn describe(&self) -> String {
        self.method.describe()
    }

    pub fn summary(&self) -> PaymentSummary {
        PaymentSummary {
            transaction_id: self.transaction_id.clone(),
            method: self.payment_method(),
            amount: self.amount.value(),
            fee: self.transaction_fee(),
            total: self.total_amount(),
            status: self.status,
            payment_date: self.payment_date,
        }
    }

    fn transition(&mut self, next: PaymentStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal transition {} -> {}",
            self.status,
            next
        );
        let from = std::mem::replace(&mut self.status, next);
        self.emit(PaymentEvent::StatusChanged { from, to: next });
    }

    fn emit(&self, event: PaymentEvent) {
        self.sink.on_event(&self.transaction_id, &event);
    }
}

impl PartialEq for Payment {
    fn eq(&self, other: &Self) -> bool {
        self.transaction_id == other.transaction_id
    }
}

impl Eq for Payment {}

impl Hash for Payment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.transaction_id.hash(state);
    }
}

impl fmt::Debug for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payment")
            .field("transaction_id", &self.transaction_id)
            .field("amount", &self.amount)
            .field("status", &self.status)
            .field("payment_date", &self.payment_date)
            .field("refunded_amount", &self.refunded_amount)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transaction: {}", self.transaction_id)?;
        writeln!(f, "Method: {}", self.payment_method())?;
        writeln!(f, "Date: {}", self.payment_date.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Amount: {}", self.amount)?;
        writeln!(
            f,
            "Fee: ${:.2} ({}%)",
            self.transaction_fee(),
            self.transaction_fee_percentage()
        )?;
        writeln!(f, "Total: ${:.2}", self.total_amount())?;
        writeln!(f, "Status: {}", self.status)?;
        if let Some(refunded) = self.refunded_amount {
            writeln!(f, "Refunded: ${refunded:.2}")?;
        }
        write!(f, "{}", self.describe())
    }
}

/// Serializable snapshot of a payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub transaction_id: TransactionId,
    pub method: &'static str,
    #[serde(serialize_with = "serialize_cents")]
    pub amount: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub fee: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub total: Decimal,
    pub status: PaymentStatus,
    pub payment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    pub destination: String,
    pub method: &'static str,
    #[serde(serialize_with = "serialize_cents")]
    pub amount: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub fee: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub total: Decimal,
    pub issued_at: DateTime<Utc>,
}
