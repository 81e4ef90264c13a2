//! Headless card presenter.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use traybridge_model::CardConfig;

use crate::host::CardInteractions;
use crate::presenter::CardPresenter;

#[derive(Default)]
struct Screen {
    detached: bool,
    visible: Option<(CardConfig, CardInteractions)>,
    presented: usize,
    removed: usize,
}

/// Presenter that keeps the "visible" card in memory.
///
/// Clones share state, so a test can hold one clone and simulate clicks
/// while the host owns another.
#[derive(Clone, Default)]
pub struct HeadlessPresenter {
    screen: Arc<Mutex<Screen>>,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A presenter with no attachment point; every `present` fails softly.
    pub fn detached() -> Self {
        let presenter = Self::new();
        presenter.set_attached(false);
        presenter
    }

    pub fn set_attached(&self, attached: bool) {
        self.lock().detached = !attached;
    }

    /// The card currently on screen.
    pub fn visible(&self) -> Option<CardConfig> {
        self.lock().visible.as_ref().map(|(card, _)| card.clone())
    }

    /// Input handle of the card currently on screen.
    pub fn interactions(&self) -> Option<CardInteractions> {
        self.lock().visible.as_ref().map(|(_, i)| i.clone())
    }

    /// Simulates pressing the action button `id`.
    pub fn click_action(&self, id: &str) -> bool {
        self.interactions().is_some_and(|i| i.action(id))
    }

    /// Simulates a click on the dismiss layer.
    pub fn click_outside(&self) -> bool {
        self.interactions().is_some_and(|i| i.dismiss())
    }

    pub fn present_count(&self) -> usize {
        self.lock().presented
    }

    pub fn remove_count(&self) -> usize {
        self.lock().removed
    }

    fn lock(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CardPresenter for HeadlessPresenter {
    fn can_attach(&self) -> bool {
        !self.lock().detached
    }

    fn present(&mut self, card: &CardConfig, interactions: CardInteractions) -> bool {
        let mut screen = self.lock();
        if screen.detached {
            return false;
        }
        screen.presented += 1;
        screen.visible = Some((card.clone(), interactions));
        true
    }

    fn remove(&mut self) {
        let mut screen = self.lock();
        if screen.visible.take().is_some() {
            screen.removed += 1;
        }
    }
}
