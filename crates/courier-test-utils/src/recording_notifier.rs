// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier that records published events for assertions.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use courier_core::{Notifier, QueueEvent};

/// A notifier that captures every published event in order.
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<QueueEvent>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// All events published so far, in publication order.
    pub async fn events(&self) -> Vec<QueueEvent> {
        self.events.lock().await.clone()
    }

    /// Number of events published so far.
    pub async fn event_count(&self) -> usize {
        self.events.lock().await.len()
    }

    /// Events excluding `QueueUpdated`, which fires on every mutation and
    /// mostly drowns out the interesting lifecycle events.
    pub async fn lifecycle_events(&self) -> Vec<QueueEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| !matches!(e, QueueEvent::QueueUpdated { .. }))
            .cloned()
            .collect()
    }

    /// Clear all recorded events.
    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, event: QueueEvent) {
        self.events.lock().await.push(event);
    }
}
