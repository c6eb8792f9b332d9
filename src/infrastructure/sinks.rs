use crate::domain::events::PaymentEvent;
use crate::domain::money::TransactionId;
use crate::domain::ports::EventSink;
use std::sync::{Arc, RwLock};

/// Forwards payment narration to `tracing`.
///
/// Rejections are logged at `WARN`, everything else at `INFO`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&self, transaction_id: &TransactionId, event: &PaymentEvent) {
        if event.is_rejection() {
            tracing::warn!(transaction_id = %transaction_id, event = %event, "payment event");
        } else {
            tracing::info!(transaction_id = %transaction_id, event = %event, "payment event");
        }
    }
}

/// Keeps every event in memory, in emission order.
///
/// Clones share the same buffer, so a clone handed to a payment can be
/// inspected through the original.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<RwLock<Vec<(TransactionId, PaymentEvent)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(TransactionId, PaymentEvent)> {
        match self.events.read() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events recorded for one payment.
    pub fn events_for(&self, transaction_id: &TransactionId) -> Vec<PaymentEvent> {
        self.events()
            .into_iter()
            .filter(|(id, _)| id == transaction_id)
            .map(|(_, event)| event)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn on_event(&self, transaction_id: &TransactionId, event: &PaymentEvent) {
        let mut events = match self.events.write() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push((transaction_id.clone(), event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::PaymentStatus;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        let id = TransactionId::generate();
        let other = TransactionId::generate();

        sink.on_event(&id, &PaymentEvent::CounterfeitCheckPassed);
        sink.on_event(&other, &PaymentEvent::ReceiptSkipped(PaymentStatus::Pending));
        sink.on_event(
            &id,
            &PaymentEvent::StatusChanged {
                from: PaymentStatus::Pending,
                to: PaymentStatus::Processing,
            },
        );

        assert_eq!(sink.events().len(), 3);
        let mine = sink.events_for(&id);
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0], PaymentEvent::CounterfeitCheckPassed);
    }

    #[test]
    fn test_clones_share_buffer() {
        let sink = RecordingSink::new();
        let clone = sink.clone();
        clone.on_event(&TransactionId::generate(), &PaymentEvent::CounterfeitCheckPassed);
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn test_tracing_sink_without_subscriber() {
        TracingSink.on_event(&TransactionId::generate(), &PaymentEvent::CounterfeitCheckPassed);
    }
}
