use super::methods::cash::Denomination;
use super::status::PaymentStatus;
use crate::error::{Refusal, ValidationError};
use rust_decimal::Decimal;
use std::fmt;

/// Narration emitted by payments as they move through their lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    StatusChanged {
        from: PaymentStatus,
        to: PaymentStatus,
    },
    ProcessSkipped(Refusal),
    ValidationFailed(ValidationError),
    /// A card authorization code or PayPal token was granted.
    Authorized {
        reference: String,
    },
    CounterfeitCheckPassed,
    ChangeDispensed {
        change: Decimal,
        breakdown: Vec<Denomination>,
    },
    Broadcast {
        hash: String,
    },
    Confirmation {
        count: u32,
        required: u32,
    },
    AwaitingConfirmations {
        count: u32,
        required: u32,
    },
    RefundIssued {
        amount: Decimal,
        note: String,
    },
    RefundRefused(Refusal),
    CancelRefused(Refusal),
    ReceiptSent {
        destination: String,
    },
    ReceiptSkipped(PaymentStatus),
}

impl PaymentEvent {
    /// Events describing a business rule that stopped an operation.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PaymentEvent::ProcessSkipped(_)
                | PaymentEvent::ValidationFailed(_)
                | PaymentEvent::RefundRefused(_)
                | PaymentEvent::CancelRefused(_)
                | PaymentEvent::ReceiptSkipped(_)
        )
    }
}

impl fmt::Display for PaymentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentEvent::StatusChanged { from, to } => write!(f, "status {from} -> {to}"),
            PaymentEvent::ProcessSkipped(reason) => write!(f, "process skipped: {reason}"),
            PaymentEvent::ValidationFailed(reason) => write!(f, "validation failed: {reason}"),
            PaymentEvent::Authorized { reference } => write!(f, "authorized ({reference})"),
            PaymentEvent::CounterfeitCheckPassed => f.write_str("counterfeit check passed"),
            PaymentEvent::ChangeDispensed { change, breakdown } => {
                write!(f, "change due ${change:.2}")?;
                for denomination in breakdown {
                    write!(f, ", {denomination}")?;
                }
                Ok(())
            }
            PaymentEvent::Broadcast { hash } => write!(f, "broadcast transaction {hash}"),
            PaymentEvent::Confirmation { count, required } => {
                write!(f, "confirmation {count}/{required}")
            }
            PaymentEvent::AwaitingConfirmations { count, required } => {
                write!(f, "awaiting confirmations ({count}/{required})")
            }
            PaymentEvent::RefundIssued { amount, note } => {
                write!(f, "refund of ${amount:.2} issued: {note}")
            }
            PaymentEvent::RefundRefused(reason) => write!(f, "refund refused: {reason}"),
            PaymentEvent::CancelRefused(reason) => write!(f, "cancel refused: {reason}"),
            PaymentEvent::ReceiptSent { destination } => write!(f, "receipt sent to {destination}"),
            PaymentEvent::ReceiptSkipped(status) => {
                write!(f, "receipt not sent, payment is {status}")
            }
        }
    }
}
