use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted by the inventory core. A notification dispatcher or
/// audit consumer subscribes downstream; the core performs no delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Item registry events
    ItemCreated(Uuid),
    ItemUpdated(Uuid),
    ItemDeactivated(Uuid),

    // Ledger events
    TransactionRecorded {
        transaction_id: Uuid,
        item_id: Uuid,
        transaction_type: String,
        quantity: Decimal,
        balance_after: Decimal,
    },
    StockTransferred {
        transfer_group_id: Uuid,
        item_id: Uuid,
        from_location_id: Uuid,
        to_location_id: Uuid,
        quantity: Decimal,
    },

    // Allocation events
    AllocationCreated {
        allocation_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
    },
    AllocationIssued {
        allocation_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
    },
    AllocationReturned {
        allocation_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
    },
    AllocationCancelled(Uuid),

    // Purchase order events
    PurchaseOrderSubmitted(Uuid),
    PurchaseOrderApproved(Uuid),
    PurchaseOrderSent(Uuid),
    PurchaseOrderReceived {
        order_id: Uuid,
        fully_received: bool,
    },
    PurchaseOrderCancelled(Uuid),
    PurchaseOrderClosed(Uuid),

    // Stock alert events
    StockAlertRaised {
        alert_id: Uuid,
        item_id: Uuid,
        alert_type: String,
        severity: String,
    },
    StockAlertResolved(Uuid),

    // Physical count events
    CountStarted(Uuid),
    CountCompleted {
        count_id: Uuid,
        adjustments: u64,
    },
    CountCancelled(Uuid),
}

/// Timestamped envelope used when persisting or forwarding events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: Event,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing a send failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    /// Event delivery is advisory; quantity state never depends on it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Event channel closed, dropping event: {}", e);
        }
    }
}

/// Background consumer that drains the event channel and logs each event.
/// External notification transports hook in here.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        info!(event = ?event, "Processing domain event");
    }
    info!("Event channel closed, event processor shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_and_receive_roundtrip() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::ItemCreated(Uuid::new_v4()))
            .await
            .expect("send should succeed");

        match rx.recv().await {
            Some(Event::ItemCreated(_)) => {}
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic.
        sender.send_or_log(Event::ItemUpdated(Uuid::new_v4())).await;
    }
}
