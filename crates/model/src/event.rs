//! Events produced by user interaction with the tray, its menu, or a card.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the user interacted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrayEventKind {
    MenuItemClick,
    TrayClick,
    CardAction,
}

impl TrayEventKind {
    /// Outbound event name seen by the host.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::MenuItemClick => "menu_item_click",
            Self::TrayClick => "tray_click",
            Self::CardAction => "card_action",
        }
    }
}

/// A single user interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TrayEvent {
    pub kind: TrayEventKind,
    pub id: String,
    pub payload: Map<String, Value>,
}

impl TrayEvent {
    /// Left click on the tray icon itself.
    pub fn tray_click() -> Self {
        Self {
            kind: TrayEventKind::TrayClick,
            id: "click".into(),
            payload: Map::new(),
        }
    }

    /// Click on a leaf or checkable menu item.
    pub fn menu_item_click(id: impl Into<String>) -> Self {
        Self {
            kind: TrayEventKind::MenuItemClick,
            id: id.into(),
            payload: Map::new(),
        }
    }

    /// Click on a card action button.
    pub fn card_action(id: impl Into<String>, label: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("label".into(), Value::String(label.into()));
        Self {
            kind: TrayEventKind::CardAction,
            id: id.into(),
            payload,
        }
    }

    /// Outbound event name.
    pub fn name(&self) -> &'static str {
        self.kind.event_name()
    }

    /// Outbound payload: the event's payload with `id` merged in.
    pub fn to_payload(&self) -> Value {
        let mut map = Map::with_capacity(self.payload.len() + 1);
        map.insert("id".into(), Value::String(self.id.clone()));
        for (k, v) in &self.payload {
            if k != "id" {
                map.insert(k.clone(), v.clone());
            }
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_names() {
        assert_eq!(TrayEvent::tray_click().name(), "tray_click");
        assert_eq!(TrayEvent::menu_item_click("quit").name(), "menu_item_click");
        assert_eq!(TrayEvent::card_action("ok", "OK").name(), "card_action");
    }

    #[test]
    fn payloads() {
        assert_eq!(TrayEvent::tray_click().to_payload(), json!({"id": "click"}));
        assert_eq!(
            TrayEvent::menu_item_click("quit").to_payload(),
            json!({"id": "quit"})
        );
        assert_eq!(
            TrayEvent::card_action("ok", "OK").to_payload(),
            json!({"id": "ok", "label": "OK"})
        );
    }

    #[test]
    fn payload_cannot_override_id() {
        let mut event = TrayEvent::menu_item_click("real");
        event.payload.insert("id".into(), json!("spoofed"));
        assert_eq!(event.to_payload(), json!({"id": "real"}));
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(TrayEventKind::MenuItemClick).unwrap(),
            json!("menu_item_click")
        );
    }
}
