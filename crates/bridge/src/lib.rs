//! Extension bridge for the traybridge tray extension.
//!
//! A host talks to the extension in two directions:
//! - **action dispatch**: request/response calls by name, routed through an
//!   [`ActionRegistry`] and answered with an [`ActionResult`]
//! - **event emission**: one-way [`ExtensionEvent`]s broadcast to every
//!   subscriber of the [`EventStream`]
//!
//! [`TrayExtension`] wires the tray manager and card overlay host into both:
//! it registers the `init`, `set_menu`, `set_tooltip`, `set_icon`,
//! `popup_menu`, `show_card` and `dispose` actions, and forwards every
//! [`TrayEvent`](traybridge_model::TrayEvent) onto the event stream.
//!
//! Everything assumes a single cooperative event loop; dispatch calls on one
//! extension must not interleave.

mod args;
mod config;
mod extension;
mod registry;
mod result;
mod stream;

pub use args::{InitArgs, SetIconArgs, SetMenuArgs, SetTooltipArgs};
pub use config::ExtensionConfig;
pub use extension::TrayExtension;
pub use registry::{ActionFuture, ActionHandler, ActionRegistry};
pub use result::ActionResult;
pub use stream::{EventStream, ExtensionEvent, MAX_EVENT_CAPACITY};

use traybridge_model::ModelError;
use traybridge_tray::TrayError;

/// Errors raised inside action handlers.
///
/// These never escape [`ActionRegistry::dispatch`]; they are turned into
/// error results.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("{action} failed: invalid arguments: {source}")]
    Args {
        action: &'static str,
        source: serde_json::Error,
    },

    #[error("{action} failed: {source}")]
    Model {
        action: &'static str,
        source: ModelError,
    },

    #[error("{action} failed: {source}")]
    Tray {
        action: &'static str,
        source: TrayError,
    },

    #[error("{action} failed: extension disposed")]
    Disposed { action: &'static str },

    #[error("action '{0}' panicked")]
    Panicked(String),
}
