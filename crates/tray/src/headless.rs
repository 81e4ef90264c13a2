//! Headless tray shell.
//!
//! Implements [`NativeTray`] without a windowing system. Every call is
//! recorded, and user input can be simulated with
//! [`click_icon`](HeadlessTray::click_icon) and
//! [`click_menu_item`](HeadlessTray::click_menu_item). Clones share state, so
//! a test can keep one clone as a probe while the manager owns another.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::native::{ClickCallback, NativeError, NativeMenuItem, NativeTray};

/// Opaque handle to a headless icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessHandle(u64);

/// A recorded native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    CreateIcon {
        icon: PathBuf,
        is_template: bool,
        tooltip: Option<String>,
    },
    SetIcon {
        icon: PathBuf,
        is_template: bool,
    },
    SetTooltip(String),
    SetContextMenu {
        top_level: usize,
    },
    RegisterClickHandler,
    PopupContextMenu,
    Destroy,
}

#[derive(Default)]
struct Shell {
    unsupported: bool,
    fail_destroy: bool,
    next_handle: u64,
    live: Option<u64>,
    icon: Option<PathBuf>,
    tooltip: Option<String>,
    menu: Vec<NativeMenuItem>,
    menu_callbacks: HashMap<String, ClickCallback>,
    icon_callback: Option<ClickCallback>,
    calls: Vec<NativeCall>,
}

impl Shell {
    fn check(&self, handle: &HeadlessHandle) -> Result<(), NativeError> {
        if self.live == Some(handle.0) {
            Ok(())
        } else {
            Err(NativeError::Failed(format!("stale tray handle {}", handle.0)))
        }
    }
}

/// In-memory tray shell.
#[derive(Clone, Default)]
pub struct HeadlessTray {
    shell: Arc<Mutex<Shell>>,
}

impl HeadlessTray {
    pub fn new() -> Self {
        Self::default()
    }

    /// A shell that refuses to create icons, like a desktop without a tray.
    pub fn unsupported() -> Self {
        let tray = Self::new();
        tray.set_supported(false);
        tray
    }

    pub fn set_supported(&self, supported: bool) {
        self.lock().unsupported = !supported;
    }

    /// Makes `destroy` report failure (the icon is still torn down).
    pub fn set_fail_destroy(&self, fail: bool) {
        self.lock().fail_destroy = fail;
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.lock().calls.clone()
    }

    pub fn create_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, NativeCall::CreateIcon { .. }))
            .count()
    }

    /// Whether an icon currently exists.
    pub fn is_live(&self) -> bool {
        self.lock().live.is_some()
    }

    pub fn icon(&self) -> Option<PathBuf> {
        self.lock().icon.clone()
    }

    pub fn tooltip(&self) -> Option<String> {
        self.lock().tooltip.clone()
    }

    /// The installed context menu.
    pub fn menu(&self) -> Vec<NativeMenuItem> {
        self.lock().menu.clone()
    }

    /// Simulates a click on the icon. Returns `false` if nothing handled it.
    pub fn click_icon(&self) -> bool {
        let callback = self.lock().icon_callback.clone();
        match callback {
            Some(cb) => {
                cb();
                true
            }
            None => false,
        }
    }

    /// Simulates a click on the menu item with `id`.
    ///
    /// When several items share an id, the one registered last wins.
    pub fn click_menu_item(&self, id: &str) -> bool {
        let callback = self.lock().menu_callbacks.get(id).cloned();
        match callback {
            Some(cb) => {
                cb();
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shell> {
        self.shell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn index_callbacks(items: &[NativeMenuItem], out: &mut HashMap<String, ClickCallback>) {
    for item in items {
        match item {
            NativeMenuItem::Item { id, on_click, .. } | NativeMenuItem::Check { id, on_click, .. } => {
                out.insert(id.clone(), Arc::clone(on_click));
            }
            NativeMenuItem::Submenu { children, .. } => index_callbacks(children, out),
            NativeMenuItem::Separator => {}
        }
    }
}

impl NativeTray for HeadlessTray {
    type Handle = HeadlessHandle;

    fn create_icon(
        &mut self,
        icon: &Path,
        is_template: bool,
        tooltip: Option<&str>,
    ) -> Result<HeadlessHandle, NativeError> {
        let mut shell = self.lock();
        shell.calls.push(NativeCall::CreateIcon {
            icon: icon.to_path_buf(),
            is_template,
            tooltip: tooltip.map(str::to_string),
        });
        if shell.unsupported {
            return Err(NativeError::Unsupported("no status notifier host".into()));
        }

        shell.next_handle += 1;
        let id = shell.next_handle;
        shell.live = Some(id);
        shell.icon = Some(icon.to_path_buf());
        shell.tooltip = tooltip.map(str::to_string);
        Ok(HeadlessHandle(id))
    }

    fn set_icon(
        &mut self,
        handle: &HeadlessHandle,
        icon: &Path,
        is_template: bool,
    ) -> Result<(), NativeError> {
        let mut shell = self.lock();
        shell.check(handle)?;
        shell.calls.push(NativeCall::SetIcon {
            icon: icon.to_path_buf(),
            is_template,
        });
        shell.icon = Some(icon.to_path_buf());
        Ok(())
    }

    fn set_tooltip(&mut self, handle: &HeadlessHandle, text: &str) -> Result<(), NativeError> {
        let mut shell = self.lock();
        shell.check(handle)?;
        shell.calls.push(NativeCall::SetTooltip(text.to_string()));
        shell.tooltip = Some(text.to_string());
        Ok(())
    }

    fn set_context_menu(
        &mut self,
        handle: &HeadlessHandle,
        menu: Vec<NativeMenuItem>,
    ) -> Result<(), NativeError> {
        let mut shell = self.lock();
        shell.check(handle)?;
        shell.calls.push(NativeCall::SetContextMenu {
            top_level: menu.len(),
        });

        let mut callbacks = HashMap::new();
        index_callbacks(&menu, &mut callbacks);
        shell.menu_callbacks = callbacks;
        shell.menu = menu;
        Ok(())
    }

    fn register_click_handler(
        &mut self,
        handle: &HeadlessHandle,
        callback: ClickCallback,
    ) -> Result<(), NativeError> {
        let mut shell = self.lock();
        shell.check(handle)?;
        shell.calls.push(NativeCall::RegisterClickHandler);
        shell.icon_callback = Some(callback);
        Ok(())
    }

    fn popup_context_menu(&mut self, handle: &HeadlessHandle) -> Result<(), NativeError> {
        let mut shell = self.lock();
        shell.check(handle)?;
        shell.calls.push(NativeCall::PopupContextMenu);
        Ok(())
    }

    fn destroy(&mut self, handle: HeadlessHandle) -> Result<(), NativeError> {
        let mut shell = self.lock();
        shell.check(&handle)?;
        shell.calls.push(NativeCall::Destroy);
        shell.live = None;
        shell.icon = None;
        shell.tooltip = None;
        shell.menu.clear();
        shell.menu_callbacks.clear();
        shell.icon_callback = None;
        if shell.fail_destroy {
            return Err(NativeError::Failed("shell refused to remove icon".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> ClickCallback {
        Arc::new(|| {})
    }

    #[test]
    fn unsupported_shell_refuses_icon() {
        let mut tray = HeadlessTray::unsupported();
        let err = tray.create_icon(Path::new("a.png"), false, None).unwrap_err();
        assert!(matches!(err, NativeError::Unsupported(_)));
        assert!(!tray.is_live());
        assert_eq!(tray.create_count(), 1);
    }

    #[test]
    fn stale_handle_is_rejected() {
        let mut tray = HeadlessTray::new();
        let handle = tray.create_icon(Path::new("a.png"), false, None).unwrap();
        tray.destroy(handle).unwrap();

        assert!(tray.set_tooltip(&handle, "x").is_err());
        assert!(tray.popup_context_menu(&handle).is_err());
    }

    #[test]
    fn duplicate_ids_last_registered_wins() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let (f, s) = (Arc::clone(&first), Arc::clone(&second));

        let mut tray = HeadlessTray::new();
        let handle = tray.create_icon(Path::new("a.png"), false, None).unwrap();
        tray.set_context_menu(
            &handle,
            vec![
                NativeMenuItem::Item {
                    id: "dup".into(),
                    label: "First".into(),
                    enabled: true,
                    on_click: Arc::new(move || {
                        f.fetch_add(1, Ordering::SeqCst);
                    }),
                },
                NativeMenuItem::Submenu {
                    label: "More".into(),
                    enabled: true,
                    children: vec![NativeMenuItem::Item {
                        id: "dup".into(),
                        label: "Second".into(),
                        enabled: true,
                        on_click: Arc::new(move || {
                            s.fetch_add(1, Ordering::SeqCst);
                        }),
                    }],
                },
            ],
        )
        .unwrap();

        assert!(tray.click_menu_item("dup"));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn destroy_clears_callbacks() {
        let mut tray = HeadlessTray::new();
        let handle = tray.create_icon(Path::new("a.png"), false, None).unwrap();
        tray.register_click_handler(&handle, noop()).unwrap();
        assert!(tray.click_icon());

        tray.destroy(handle).unwrap();
        assert!(!tray.click_icon());
        assert!(tray.menu().is_empty());
    }

    #[test]
    fn failing_destroy_still_tears_down() {
        let mut tray = HeadlessTray::new();
        tray.set_fail_destroy(true);
        let handle = tray.create_icon(Path::new("a.png"), false, None).unwrap();

        assert!(tray.destroy(handle).is_err());
        assert!(!tray.is_live());
    }
}
