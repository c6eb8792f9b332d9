use super::order::PaymentOrder;
use crate::domain::payment::{Payment, PaymentSummary};
use crate::domain::ports::EventSinkRef;
use crate::error::Result;
use crate::policy::PaymentPolicy;

/// Turns orders into processed payments.
///
/// Every payment created here shares the checkout's policy and event sink,
/// and is kept so it can be refunded, cancelled or summarised later.
pub struct Checkout {
    policy: PaymentPolicy,
    sink: EventSinkRef,
    payments: Vec<Payment>,
}

impl Checkout {
    pub fn new(policy: PaymentPolicy, sink: EventSinkRef) -> Self {
        Self {
            policy,
            sink,
            payments: Vec::new(),
        }
    }

    /// Creates the payment for `order` and processes it.
    ///
    /// Construction errors are returned; a payment that fails processing is
    /// still kept, with its `Failed` (or `Processing`) status.
    pub fn submit(&mut self, order: PaymentOrder) -> Result<&Payment> {
        let payment = order.into_payment()?.with_policy(self.policy);
        Ok(self.admit(payment))
    }

    /// Processes an already constructed payment under this checkout's sink.
    pub fn admit(&mut self, payment: Payment) -> &Payment {
        let mut payment = payment.with_sink(self.sink.clone());
        payment.process();
        self.payments.push(payment);
        &self.payments[self.payments.len() - 1]
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn payments_mut(&mut self) -> &mut [Payment] {
        &mut self.payments
    }

    pub fn summaries(&self) -> Vec<PaymentSummary> {
        self.payments.iter().map(Payment::summary).collect()
    }
}
