// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget event fan-out.

use async_trait::async_trait;
use courier_core::{Notifier, QueueEvent};
use tokio::sync::broadcast;

/// Broadcasts queue events to any number of subscribers.
///
/// Publishing is best-effort: with no subscribers, or with a subscriber
/// that has fallen behind, events are dropped silently. Delivery state
/// never depends on whether anyone is listening.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<QueueEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn publish(&self, event: QueueEvent) {
        // Err means no live receivers, which is fine.
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let notifier = BroadcastNotifier::default();
        notifier
            .publish(QueueEvent::MessageSent {
                id: "m1".to_string(),
            })
            .await;
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let notifier = BroadcastNotifier::default();
        let mut rx = notifier.subscribe();

        notifier
            .publish(QueueEvent::MessageSent {
                id: "m1".to_string(),
            })
            .await;
        notifier
            .publish(QueueEvent::MessageFailed {
                id: "m2".to_string(),
                error: "boom".to_string(),
            })
            .await;

        assert!(matches!(
            rx.recv().await.unwrap(),
            QueueEvent::MessageSent { id } if id == "m1"
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            QueueEvent::MessageFailed { id, .. } if id == "m2"
        ));
    }

    #[tokio::test]
    async fn lagging_subscriber_does_not_block_publishing() {
        let notifier = BroadcastNotifier::new(1);
        let _rx = notifier.subscribe();

        for n in 0..16 {
            notifier
                .publish(QueueEvent::MessageSent {
                    id: format!("m{n}"),
                })
                .await;
        }
    }
}
