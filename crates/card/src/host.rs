//! Card overlay state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use traybridge_model::{CardConfig, TrayEvent};

use crate::presenter::CardPresenter;

/// Receives a `card_action` event when the user presses a card button.
pub type ActionCallback = Arc<dyn Fn(TrayEvent) + Send + Sync + 'static>;

enum Slot {
    Hidden,
    Shown {
        id: u64,
        config: CardConfig,
        timer: Option<CancellationToken>,
    },
}

struct Inner {
    presenter: Box<dyn CardPresenter>,
    slot: Slot,
    next_id: u64,
}

impl Inner {
    /// Cancels the timer and removes the presentation, if any.
    fn clear(&mut self) {
        if let Slot::Shown { id, timer, .. } = std::mem::replace(&mut self.slot, Slot::Hidden) {
            if let Some(timer) = timer {
                timer.cancel();
            }
            self.presenter.remove();
            tracing::debug!(card = id, "card hidden");
        }
    }
}

/// Single-slot host for transient cards.
///
/// Clones share the same slot.
#[derive(Clone)]
pub struct CardOverlayHost {
    inner: Arc<Mutex<Inner>>,
}

impl CardOverlayHost {
    pub fn new(presenter: impl CardPresenter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                presenter: Box::new(presenter),
                slot: Slot::Hidden,
                next_id: 0,
            })),
        }
    }

    /// Shows `config`, replacing any visible card.
    ///
    /// Returns `false` without showing anything when the presenter has no
    /// attachment point; this is a soft failure, not an error, and the card
    /// already shown (with its timer) stays as it is. The auto-close timer
    /// needs a tokio runtime; without one the card stays until hidden.
    pub fn show_card(&self, config: CardConfig, on_action: ActionCallback) -> bool {
        let mut inner = self.lock();
        if !inner.presenter.can_attach() {
            tracing::debug!("no attachment point for card, skipping");
            return false;
        }
        inner.clear();

        let id = inner.next_id;
        inner.next_id += 1;

        let interactions = CardInteractions {
            host: Arc::downgrade(&self.inner),
            card: id,
            on_action,
        };
        if !inner.presenter.present(&config, interactions) {
            tracing::debug!(card = id, "no attachment point for card, skipping");
            return false;
        }

        let timer = config
            .auto_close
            .and_then(|after| self.start_timer(id, after));

        tracing::debug!(card = id, auto_close = ?config.auto_close, "card shown");
        inner.slot = Slot::Shown { id, config, timer };
        true
    }

    /// Hides the visible card. No-op when nothing is shown.
    pub fn hide(&self) {
        self.lock().clear();
    }

    pub fn is_shown(&self) -> bool {
        matches!(self.lock().slot, Slot::Shown { .. })
    }

    /// The visible card's configuration.
    pub fn current(&self) -> Option<CardConfig> {
        match &self.lock().slot {
            Slot::Shown { config, .. } => Some(config.clone()),
            Slot::Hidden => None,
        }
    }

    /// Hides the card only if `id` is still the one shown.
    fn hide_if(&self, id: u64) -> bool {
        let mut inner = self.lock();
        let shown = matches!(inner.slot, Slot::Shown { id: current, .. } if current == id);
        if shown {
            inner.clear();
        }
        shown
    }

    fn start_timer(&self, id: u64, after: Duration) -> Option<CancellationToken> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(card = id, "no async runtime, auto-close disabled");
            return None;
        };

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let host = Arc::downgrade(&self.inner);
        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(after) => {
                    if let Some(inner) = host.upgrade() {
                        tracing::debug!(card = id, "card auto-closed");
                        CardOverlayHost { inner }.hide_if(id);
                    }
                }
            }
        });
        Some(cancel)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle given to a presenter for routing user input on one card.
///
/// Inputs for a card that has since been replaced or hidden are ignored.
#[derive(Clone)]
pub struct CardInteractions {
    host: Weak<Mutex<Inner>>,
    card: u64,
    on_action: ActionCallback,
}

impl CardInteractions {
    /// A card button was pressed: emits `card_action`, then hides the card.
    ///
    /// Returns `false` if the card is gone or has no such action.
    pub fn action(&self, action_id: &str) -> bool {
        let Some(host) = self.host() else {
            return false;
        };

        let label = match &host.lock().slot {
            Slot::Shown { id, config, .. } if *id == self.card => {
                config.find_action(action_id).map(|a| a.label.clone())
            }
            _ => None,
        };
        let Some(label) = label else {
            tracing::debug!(card = self.card, action = %action_id, "stale or unknown card action");
            return false;
        };

        (self.on_action)(TrayEvent::card_action(action_id, label));
        host.hide_if(self.card);
        true
    }

    /// The user clicked outside the card: hides it without an event.
    pub fn dismiss(&self) -> bool {
        self.host().is_some_and(|host| host.hide_if(self.card))
    }

    fn host(&self) -> Option<CardOverlayHost> {
        self.host.upgrade().map(|inner| CardOverlayHost { inner })
    }
}
