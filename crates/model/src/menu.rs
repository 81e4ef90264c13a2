//! Declarative context-menu tree.
//!
//! Hosts describe menus as nested JSON objects. [`parse_menu`] turns that
//! payload into an owned [`MenuItem`] tree; [`MenuItem::to_value`] emits the
//! canonical form back.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ModelError;

/// The kind of a menu node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuKind {
    /// Clickable entry, or a submenu when it has children.
    #[default]
    Item,
    /// Horizontal divider.
    Separator,
    /// Checkable entry.
    Check,
}

impl MenuKind {
    /// Case-insensitive lookup. Unrecognised strings map to [`MenuKind::Item`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "separator" => Self::Separator,
            "check" | "checkbox" => Self::Check,
            _ => Self::Item,
        }
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Separator => "separator",
            Self::Check => "check",
        }
    }
}

/// A single node of the menu tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Identifier reported back on click. Empty for anonymous separators.
    pub id: String,
    /// Display text.
    pub label: String,
    pub kind: MenuKind,
    pub enabled: bool,
    pub checked: bool,
    /// Ordered children. Non-empty on an `Item` makes it a submenu.
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    /// Creates an enabled leaf item.
    pub fn item(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: MenuKind::Item,
            enabled: true,
            checked: false,
            children: Vec::new(),
        }
    }

    /// Creates an enabled checkable item.
    pub fn check(id: impl Into<String>, label: impl Into<String>, checked: bool) -> Self {
        Self {
            kind: MenuKind::Check,
            checked,
            ..Self::item(id, label)
        }
    }

    /// Creates a separator.
    pub fn separator() -> Self {
        Self {
            kind: MenuKind::Separator,
            ..Self::item("", "")
        }
    }

    /// Creates a submenu holding `children`.
    pub fn submenu(
        id: impl Into<String>,
        label: impl Into<String>,
        children: Vec<MenuItem>,
    ) -> Self {
        Self {
            children,
            ..Self::item(id, label)
        }
    }

    /// Sets the enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns `true` if this node renders as a submenu.
    pub fn is_submenu(&self) -> bool {
        self.kind == MenuKind::Item && !self.children.is_empty()
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(MenuItem::node_count).sum::<usize>()
    }

    /// Emits the canonical payload form, nesting children under `items`.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if !self.id.is_empty() {
            map.insert("id".into(), Value::String(self.id.clone()));
        }
        map.insert("label".into(), Value::String(self.label.clone()));
        map.insert("type".into(), Value::String(self.kind.as_str().into()));
        map.insert("enabled".into(), Value::Bool(self.enabled));
        map.insert("checked".into(), Value::Bool(self.checked));
        if !self.children.is_empty() {
            map.insert(
                "items".into(),
                Value::Array(self.children.iter().map(MenuItem::to_value).collect()),
            );
        }
        Value::Object(map)
    }
}

/// Loose shape of a menu node as hosts send it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMenuItem {
    id: Option<String>,
    label: Option<String>,
    text: Option<String>,
    title: Option<String>,
    #[serde(rename = "type")]
    type_: Option<String>,
    kind: Option<String>,
    enabled: Option<bool>,
    disabled: Option<bool>,
    checked: Option<bool>,
    items: Option<Vec<RawMenuItem>>,
    children: Option<Vec<RawMenuItem>>,
}

impl RawMenuItem {
    fn into_item(self, path: &str) -> Result<MenuItem, ModelError> {
        let kind = self
            .type_
            .as_deref()
            .or(self.kind.as_deref())
            .map(MenuKind::parse)
            .unwrap_or_default();

        let id = self.id.filter(|id| !id.trim().is_empty());
        if id.is_none() && kind != MenuKind::Separator {
            return Err(ModelError::MalformedMenu {
                path: path.to_string(),
            });
        }
        let id = id.unwrap_or_default();
        let label = self
            .label
            .or(self.text)
            .or(self.title)
            .unwrap_or_else(|| id.clone());
        let enabled = self
            .enabled
            .unwrap_or_else(|| !self.disabled.unwrap_or(false));

        // `items` is the primary key; an empty `items` falls through to `children`.
        let raw_children = match self.items {
            Some(items) if !items.is_empty() => items,
            _ => self.children.unwrap_or_default(),
        };
        let children = parse_nodes(raw_children, &format!("{path}.items"))?;

        Ok(MenuItem {
            id,
            label,
            kind,
            enabled,
            checked: self.checked.unwrap_or(false),
            children,
        })
    }
}

fn parse_nodes(raw: Vec<RawMenuItem>, prefix: &str) -> Result<Vec<MenuItem>, ModelError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, node)| node.into_item(&format!("{prefix}[{i}]")))
        .collect()
}

/// Parses a JSON array of menu-item payloads into an owned tree.
pub fn parse_menu(items: &Value) -> Result<Vec<MenuItem>, ModelError> {
    let raw = Vec::<RawMenuItem>::deserialize(items)?;
    parse_nodes(raw, "items")
}
