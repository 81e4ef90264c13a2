//! Extension configuration.

use serde::{Deserialize, Serialize};

/// Tunables for a [`TrayExtension`](crate::TrayExtension).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Extension name the host imports (`"tray"` by default).
    #[serde(default = "default_name")]
    pub name: String,

    /// Broadcast buffer size; slower subscribers lag past this. Clamped to
    /// [`MAX_EVENT_CAPACITY`](crate::MAX_EVENT_CAPACITY).
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Tooltip used by `init` when the call supplies none.
    #[serde(default)]
    pub default_tooltip: Option<String>,

    /// Auto-close applied by `show_card` when the call omits `auto_close_ms`.
    #[serde(default)]
    pub default_card_auto_close_ms: Option<u64>,
}

fn default_name() -> String {
    "tray".into()
}

fn default_event_capacity() -> usize {
    256
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            event_capacity: default_event_capacity(),
            default_tooltip: None,
            default_card_auto_close_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config() {
        let config = ExtensionConfig::default();
        assert_eq!(config.name, "tray");
        assert_eq!(config.event_capacity, 256);
        assert!(config.default_tooltip.is_none());
        assert!(config.default_card_auto_close_ms.is_none());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ExtensionConfig =
            serde_json::from_value(json!({"default_card_auto_close_ms": 4000})).unwrap();
        assert_eq!(config.name, "tray");
        assert_eq!(config.default_card_auto_close_ms, Some(4000));
    }
}
