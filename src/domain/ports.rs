use super::events::PaymentEvent;
use super::money::TransactionId;
use std::sync::Arc;

/// Receives the narration of every payment it is attached to.
pub trait EventSink: Send + Sync {
    fn on_event(&self, transaction_id: &TransactionId, event: &PaymentEvent);
}

pub type EventSinkRef = Arc<dyn EventSink>;
