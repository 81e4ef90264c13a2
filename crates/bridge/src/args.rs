//! Typed action arguments.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::BridgeError;

/// Arguments of `init`.
#[derive(Debug, Clone, Deserialize)]
pub struct InitArgs {
    pub icon: PathBuf,
    #[serde(default)]
    pub tooltip: Option<String>,
    #[serde(default)]
    pub is_template: bool,
}

/// Arguments of `set_menu`. `items` is parsed by the menu model.
#[derive(Debug, Clone, Deserialize)]
pub struct SetMenuArgs {
    pub items: Value,
}

/// Arguments of `set_tooltip`. The legacy client sends `text`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetTooltipArgs {
    #[serde(default, alias = "text")]
    pub tooltip: Option<String>,
}

/// Arguments of `set_icon`. The legacy client sends `path`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetIconArgs {
    #[serde(alias = "path")]
    pub icon: PathBuf,
    #[serde(default)]
    pub is_template: bool,
}

/// Decodes `args` for `action`.
pub(crate) fn decode<T>(action: &'static str, args: Value) -> Result<T, BridgeError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(args).map_err(|source| BridgeError::Args { action, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn init_defaults() {
        let args: InitArgs = decode("init", json!({"icon": "a.png"})).unwrap();
        assert_eq!(args.icon, PathBuf::from("a.png"));
        assert!(args.tooltip.is_none());
        assert!(!args.is_template);
    }

    #[test]
    fn init_requires_icon() {
        let err = decode::<InitArgs>("init", json!({"tooltip": "x"})).unwrap_err();
        assert!(err.to_string().starts_with("init failed: invalid arguments"));
        assert!(err.to_string().contains("icon"));
    }

    #[test]
    fn tooltip_accepts_legacy_key() {
        let args: SetTooltipArgs = decode("set_tooltip", json!({"text": "Hello"})).unwrap();
        assert_eq!(args.tooltip.as_deref(), Some("Hello"));

        let args: SetTooltipArgs = decode("set_tooltip", json!({"tooltip": null})).unwrap();
        assert!(args.tooltip.is_none());
    }

    #[test]
    fn icon_accepts_legacy_key() {
        let args: SetIconArgs = decode("set_icon", json!({"path": "b.png", "is_template": true}))
            .unwrap();
        assert_eq!(args.icon, PathBuf::from("b.png"));
        assert!(args.is_template);
    }

    #[test]
    fn set_menu_requires_items() {
        assert!(decode::<SetMenuArgs>("set_menu", json!({})).is_err());
    }
}
