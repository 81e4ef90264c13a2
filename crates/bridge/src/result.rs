//! Structured action results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a dispatched action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ActionResult {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
            data: None,
        }
    }

    pub fn success_with(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::success()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_serializes_without_optional_fields() {
        assert_eq!(
            serde_json::to_value(ActionResult::success()).unwrap(),
            json!({"ok": true})
        );
    }

    #[test]
    fn error_serializes_message() {
        assert_eq!(
            serde_json::to_value(ActionResult::error("Unknown action: x")).unwrap(),
            json!({"ok": false, "error": "Unknown action: x"})
        );
    }

    #[test]
    fn success_with_data() {
        let result = ActionResult::success_with(json!(["a", "b"]));
        assert!(result.ok);
        assert_eq!(result.data, Some(json!(["a", "b"])));
    }
}
