//! Menu model to native menu conversion.

use std::sync::Arc;

use traybridge_model::{MenuItem, MenuKind, TrayEvent};

use crate::events::EventSink;
use crate::native::{ClickCallback, NativeMenuItem};

/// Converts a menu tree into native items, depth-first, preserving order.
///
/// Leaf and checkable items get a callback that emits a `menu_item_click`
/// event carrying the item id. A checkable item's toggled state stays with
/// the shell; it is not written back into the model.
pub fn to_native(items: &[MenuItem], sink: &EventSink) -> Vec<NativeMenuItem> {
    items.iter().map(|item| convert(item, sink)).collect()
}

fn convert(item: &MenuItem, sink: &EventSink) -> NativeMenuItem {
    match item.kind {
        MenuKind::Separator => NativeMenuItem::Separator,
        MenuKind::Check => NativeMenuItem::Check {
            id: item.id.clone(),
            label: item.label.clone(),
            enabled: item.enabled,
            checked: item.checked,
            on_click: click_emitter(sink, &item.id),
        },
        MenuKind::Item if item.is_submenu() => NativeMenuItem::Submenu {
            label: item.label.clone(),
            enabled: item.enabled,
            children: to_native(&item.children, sink),
        },
        MenuKind::Item => NativeMenuItem::Item {
            id: item.id.clone(),
            label: item.label.clone(),
            enabled: item.enabled,
            on_click: click_emitter(sink, &item.id),
        },
    }
}

fn click_emitter(sink: &EventSink, id: &str) -> ClickCallback {
    let sink = sink.clone();
    let id = id.to_string();
    Arc::new(move || {
        tracing::trace!(id = %id, "menu item clicked");
        sink.emit(TrayEvent::menu_item_click(id.clone()));
    })
}
