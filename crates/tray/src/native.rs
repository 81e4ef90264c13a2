//! Capability interface to the platform tray shell.
//!
//! One adapter per target platform implements [`NativeTray`]; the manager
//! never branches on platform identity.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Callback invoked by the shell when the user clicks something.
pub type ClickCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Errors reported by a native adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NativeError {
    /// The desktop environment has no tray support.
    #[error("unsupported environment: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Failed(String),
}

/// A native menu node, ready to hand to the shell.
#[derive(Clone)]
pub enum NativeMenuItem {
    Separator,
    Item {
        id: String,
        label: String,
        enabled: bool,
        on_click: ClickCallback,
    },
    Check {
        id: String,
        label: String,
        enabled: bool,
        checked: bool,
        on_click: ClickCallback,
    },
    /// Not clickable on its own.
    Submenu {
        label: String,
        enabled: bool,
        children: Vec<NativeMenuItem>,
    },
}

impl NativeMenuItem {
    /// Short name of the node kind (`separator`, `item`, `check`, `submenu`).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Separator => "separator",
            Self::Item { .. } => "item",
            Self::Check { .. } => "check",
            Self::Submenu { .. } => "submenu",
        }
    }

    /// Menu item id, if the node is clickable.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Item { id, .. } | Self::Check { id, .. } => Some(id.as_str()),
            Self::Separator | Self::Submenu { .. } => None,
        }
    }

    pub fn children(&self) -> &[NativeMenuItem] {
        match self {
            Self::Submenu { children, .. } => children,
            _ => &[],
        }
    }
}

impl fmt::Debug for NativeMenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Separator => f.write_str("Separator"),
            Self::Item { id, label, enabled, .. } => f
                .debug_struct("Item")
                .field("id", id)
                .field("label", label)
                .field("enabled", enabled)
                .finish_non_exhaustive(),
            Self::Check {
                id,
                label,
                enabled,
                checked,
                ..
            } => f
                .debug_struct("Check")
                .field("id", id)
                .field("label", label)
                .field("enabled", enabled)
                .field("checked", checked)
                .finish_non_exhaustive(),
            Self::Submenu {
                label,
                enabled,
                children,
            } => f
                .debug_struct("Submenu")
                .field("label", label)
                .field("enabled", enabled)
                .field("children", children)
                .finish(),
        }
    }
}

/// Platform tray shell.
///
/// The handle returned by [`create_icon`](Self::create_icon) is owned by the
/// caller and passed back to every other method; [`destroy`](Self::destroy)
/// consumes it.
pub trait NativeTray: Send + 'static {
    type Handle: Send + 'static;

    /// Creates the tray icon. Fails with [`NativeError::Unsupported`] when
    /// the environment has no tray.
    fn create_icon(
        &mut self,
        icon: &Path,
        is_template: bool,
        tooltip: Option<&str>,
    ) -> Result<Self::Handle, NativeError>;

    /// Swaps the icon image.
    fn set_icon(
        &mut self,
        handle: &Self::Handle,
        icon: &Path,
        is_template: bool,
    ) -> Result<(), NativeError>;

    fn set_tooltip(&mut self, handle: &Self::Handle, text: &str) -> Result<(), NativeError>;

    /// Replaces the context menu wholesale.
    fn set_context_menu(
        &mut self,
        handle: &Self::Handle,
        menu: Vec<NativeMenuItem>,
    ) -> Result<(), NativeError>;

    /// Registers the callback for clicks on the icon itself (not the menu).
    fn register_click_handler(
        &mut self,
        handle: &Self::Handle,
        callback: ClickCallback,
    ) -> Result<(), NativeError>;

    /// Shows the context menu at the platform-default anchor.
    fn popup_context_menu(&mut self, handle: &Self::Handle) -> Result<(), NativeError>;

    fn destroy(&mut self, handle: Self::Handle) -> Result<(), NativeError>;
}
