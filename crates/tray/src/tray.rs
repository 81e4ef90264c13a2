//! Tray manager state machine.
//!
//! Two states: `Uninitialized` and `Initialized`. The native handle only
//! exists while initialized; [`TrayManager::dispose`] always returns to
//! `Uninitialized`, even when the shell fails to tear the icon down.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use traybridge_model::{MenuItem, TrayEvent};

use crate::TrayError;
use crate::events::{EventSink, TrayEvents};
use crate::menu::to_native;
use crate::native::NativeTray;

enum State<H> {
    Uninitialized,
    Initialized {
        handle: H,
        icon: PathBuf,
        is_template: bool,
        tooltip: Option<String>,
        menu: Vec<MenuItem>,
    },
}

/// Snapshot of the manager's state, for inspection and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayStatus {
    Uninitialized,
    Initialized {
        icon: PathBuf,
        is_template: bool,
        tooltip: Option<String>,
        menu: Vec<MenuItem>,
    },
}

/// Owns the native tray icon and its context menu.
pub struct TrayManager<B: NativeTray> {
    backend: B,
    state: State<B::Handle>,
    events: EventSink,
}

impl<B: NativeTray> TrayManager<B> {
    /// Creates an uninitialized manager and the stream its callbacks feed.
    pub fn new(backend: B) -> (Self, TrayEvents) {
        let (events, rx) = EventSink::channel();
        let manager = Self {
            backend,
            state: State::Uninitialized,
            events,
        };
        (manager, rx)
    }

    /// Returns a producer handle for the manager's event stream.
    pub fn event_sink(&self) -> EventSink {
        self.events.clone()
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Initialized { .. })
    }

    pub fn status(&self) -> TrayStatus {
        match &self.state {
            State::Uninitialized => TrayStatus::Uninitialized,
            State::Initialized {
                icon,
                is_template,
                tooltip,
                menu,
                ..
            } => TrayStatus::Initialized {
                icon: icon.clone(),
                is_template: *is_template,
                tooltip: tooltip.clone(),
                menu: menu.clone(),
            },
        }
    }

    /// Creates the tray icon.
    ///
    /// A no-op when already initialized, so hot-reload re-entry keeps the
    /// existing icon. On failure the manager stays uninitialized and the call
    /// can be retried.
    pub fn initialize(
        &mut self,
        icon: impl AsRef<Path>,
        tooltip: Option<String>,
        is_template: bool,
    ) -> Result<(), TrayError> {
        if self.is_initialized() {
            tracing::debug!("tray already initialized, ignoring init");
            return Ok(());
        }

        let icon = icon.as_ref().to_path_buf();
        let handle = self
            .backend
            .create_icon(&icon, is_template, tooltip.as_deref())?;

        let sink = self.events.clone();
        let on_click = Arc::new(move || {
            sink.emit(TrayEvent::tray_click());
        });
        if let Err(e) = self.backend.register_click_handler(&handle, on_click) {
            tracing::warn!(error = %e, "failed to register tray click handler");
            if let Err(e) = self.backend.destroy(handle) {
                tracing::warn!(error = %e, "failed to destroy half-initialized tray");
            }
            return Err(e.into());
        }

        tracing::info!(icon = %icon.display(), is_template, "tray initialized");
        self.state = State::Initialized {
            handle,
            icon,
            is_template,
            tooltip,
            menu: Vec::new(),
        };
        Ok(())
    }

    /// Replaces the context menu.
    pub fn set_menu(&mut self, items: Vec<MenuItem>) -> Result<(), TrayError> {
        let State::Initialized { handle, menu, .. } = &mut self.state else {
            return Err(TrayError::NotInitialized);
        };

        let native = to_native(&items, &self.events);
        self.backend.set_context_menu(handle, native)?;
        tracing::debug!(items = items.len(), "tray menu replaced");
        *menu = items;
        Ok(())
    }

    /// Updates the tooltip. Does nothing while uninitialized.
    pub fn set_tooltip(&mut self, text: Option<String>) -> Result<(), TrayError> {
        let State::Initialized {
            handle, tooltip, ..
        } = &mut self.state
        else {
            tracing::debug!("set_tooltip before init, ignoring");
            return Ok(());
        };

        self.backend
            .set_tooltip(handle, text.as_deref().unwrap_or_default())?;
        *tooltip = text;
        Ok(())
    }

    /// Swaps the tray image without recreating the icon.
    pub fn set_icon(&mut self, path: impl AsRef<Path>, template: bool) -> Result<(), TrayError> {
        let State::Initialized {
            handle,
            icon,
            is_template,
            ..
        } = &mut self.state
        else {
            return Err(TrayError::NotInitialized);
        };

        let path = path.as_ref();
        self.backend.set_icon(handle, path, template)?;
        *icon = path.to_path_buf();
        *is_template = template;
        Ok(())
    }

    /// Shows the context menu. Does nothing while uninitialized.
    pub fn popup_menu(&mut self) -> Result<(), TrayError> {
        let State::Initialized { handle, .. } = &self.state else {
            tracing::debug!("popup_menu before init, ignoring");
            return Ok(());
        };
        self.backend.popup_context_menu(handle)?;
        Ok(())
    }

    /// Destroys the icon and closes the event stream. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let State::Initialized { handle, .. } =
            std::mem::replace(&mut self.state, State::Uninitialized)
        {
            match self.backend.destroy(handle) {
                Ok(()) => tracing::info!("tray disposed"),
                Err(e) => tracing::warn!(error = %e, "native destroy failed, tray state reset anyway"),
            }
        }
        self.events.close();
    }
}
