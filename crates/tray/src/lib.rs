//! System tray icon and context menu for the traybridge extension.
//!
//! [`TrayManager`] owns the native tray handle and translates the declarative
//! menu model into native menu items. Native callbacks are republished as
//! [`TrayEvent`](traybridge_model::TrayEvent)s on an internal stream:
//! - [`EventSink`]: producer side, cloned into every native callback
//! - [`TrayEvents`]: consumer side, read by the extension bridge
//!
//! The shell itself sits behind the [`NativeTray`] trait. [`HeadlessTray`]
//! implements it without a windowing system and can simulate user input.
//!
//! # Platform notes
//! - Tray APIs are thread-affine on every supported OS; drive the manager
//!   from the thread that owns the UI context.
//! - Icon formats: PNG in general, multi-resolution ICO on Windows,
//!   monochrome template images (with `@2x`) on macOS.

mod events;
mod headless;
mod menu;
mod native;
mod tray;

pub use events::{EventSink, TrayEvents};
pub use headless::{HeadlessHandle, HeadlessTray, NativeCall};
pub use menu::to_native;
pub use native::{ClickCallback, NativeError, NativeMenuItem, NativeTray};
pub use tray::{TrayManager, TrayStatus};

/// Errors produced by the tray manager.
#[derive(Debug, thiserror::Error)]
pub enum TrayError {
    #[error("tray not supported: {0}")]
    Unsupported(String),

    #[error("tray not initialized")]
    NotInitialized,

    #[error("native tray error: {0}")]
    Native(String),
}

impl From<NativeError> for TrayError {
    fn from(err: NativeError) -> Self {
        match err {
            NativeError::Unsupported(reason) => Self::Unsupported(reason),
            NativeError::Failed(reason) => Self::Native(reason),
        }
    }
}
