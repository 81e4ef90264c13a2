//! Broadcast stream of outbound events.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use traybridge_model::TrayEvent;

/// An event as the host sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionEvent {
    pub name: String,
    pub payload: Value,
}

impl From<TrayEvent> for ExtensionEvent {
    fn from(event: TrayEvent) -> Self {
        Self {
            name: event.name().to_string(),
            payload: event.to_payload(),
        }
    }
}

/// Largest per-subscriber buffer an [`EventStream`] allocates.
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

/// Multi-producer, multi-subscriber event stream.
///
/// Every subscriber receives every event emitted after it subscribed, in
/// emission order. A subscriber that falls more than `capacity` events
/// behind observes a lag error and skips ahead. The stream is closed once;
/// later emits are dropped.
pub struct EventStream {
    tx: Mutex<Option<broadcast::Sender<ExtensionEvent>>>,
}

impl EventStream {
    /// Creates a stream buffering up to `capacity` events per subscriber,
    /// clamped to `1..=MAX_EVENT_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.clamp(1, MAX_EVENT_CAPACITY));
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    /// Publishes `event`. Returns `false` if the stream is closed.
    ///
    /// An event published with no subscribers is discarded.
    pub fn emit(&self, event: ExtensionEvent) -> bool {
        let guard = self.lock();
        let Some(tx) = guard.as_ref() else {
            tracing::debug!(event = %event.name, "emit after close, dropping event");
            return false;
        };
        if tx.send(event).is_err() {
            tracing::trace!("no subscribers for event");
        }
        true
    }

    /// Subscribes to future events. After close, the receiver is already ended.
    pub fn subscribe(&self) -> broadcast::Receiver<ExtensionEvent> {
        match self.lock().as_ref() {
            Some(tx) => tx.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    /// Closes the stream. Returns `true` on the first call only.
    pub fn close(&self) -> bool {
        let closed = self.lock().take().is_some();
        if closed {
            tracing::debug!("extension event stream closed");
        }
        closed
    }

    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Option<broadcast::Sender<ExtensionEvent>>> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
