//! Internal event stream between native callbacks and the bridge.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use traybridge_model::TrayEvent;

/// Producer side of the tray event stream.
///
/// Cheap to clone; every clone feeds the same stream. Once [`close`](Self::close)
/// is called, further events are dropped.
#[derive(Clone)]
pub struct EventSink {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<TrayEvent>>>>,
}

/// Consumer side of the tray event stream.
pub struct TrayEvents {
    rx: mpsc::UnboundedReceiver<TrayEvent>,
}

impl EventSink {
    /// Creates a connected sink/stream pair.
    pub fn channel() -> (Self, TrayEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            TrayEvents { rx },
        )
    }

    /// Pushes an event. Returns `false` if the stream is closed.
    pub fn emit(&self, event: TrayEvent) -> bool {
        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => {
                tracing::debug!(name = event.name(), id = %event.id, "event stream closed, dropping event");
                false
            }
        }
    }

    /// Closes the stream. Consumers drain what is buffered, then see the end.
    pub fn close(&self) {
        let mut guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            tracing::debug!("tray event stream closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl TrayEvents {
    /// Waits for the next event. `None` once the stream is closed and drained.
    pub async fn recv(&mut self) -> Option<TrayEvent> {
        self.rx.recv().await
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> Option<TrayEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_and_receive_in_order() {
        let (sink, mut events) = EventSink::channel();
        assert!(sink.emit(TrayEvent::tray_click()));
        assert!(sink.clone().emit(TrayEvent::menu_item_click("quit")));

        assert_eq!(events.try_recv(), Some(TrayEvent::tray_click()));
        assert_eq!(events.try_recv(), Some(TrayEvent::menu_item_click("quit")));
        assert!(events.try_recv().is_none());
    }

    #[tokio::test]
    async fn close_ends_stream_after_drain() {
        let (sink, mut events) = EventSink::channel();
        sink.emit(TrayEvent::tray_click());
        sink.close();

        assert!(sink.is_closed());
        assert!(!sink.emit(TrayEvent::tray_click()));
        assert_eq!(events.recv().await, Some(TrayEvent::tray_click()));
        assert_eq!(events.recv().await, None);
    }

    #[test]
    fn close_is_idempotent() {
        let (sink, _events) = EventSink::channel();
        sink.close();
        sink.close();
        assert!(sink.is_closed());
    }
}
