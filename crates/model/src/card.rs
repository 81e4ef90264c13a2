//! Transient card description.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ModelError;

/// A button on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardAction {
    pub id: String,
    pub label: String,
}

impl CardAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Contents of a card overlay. Built once per `show_card`, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardConfig {
    pub title: Option<String>,
    pub body: Option<String>,
    pub actions: Vec<CardAction>,
    /// Hide automatically after this long without interaction.
    pub auto_close: Option<Duration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCard {
    title: Option<String>,
    body: Option<String>,
    actions: Option<Vec<RawCardAction>>,
    auto_close_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCardAction {
    id: Option<String>,
    label: Option<String>,
}

impl CardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn action(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.actions.push(CardAction::new(id, label));
        self
    }

    pub fn auto_close(mut self, after: Duration) -> Self {
        self.auto_close = Some(after);
        self
    }

    /// Looks up an action by id.
    pub fn find_action(&self, id: &str) -> Option<&CardAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// Parses a `show_card` payload.
    ///
    /// `auto_close_ms: 0` is treated as "no auto-close". An action without a
    /// label uses its id.
    pub fn parse(value: &Value) -> Result<Self, ModelError> {
        let raw = RawCard::deserialize(value)?;

        let actions = raw
            .actions
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, action)| {
                let id = action
                    .id
                    .filter(|id| !id.trim().is_empty())
                    .ok_or_else(|| ModelError::MalformedCard {
                        path: format!("actions[{i}]"),
                    })?;
                let label = action.label.unwrap_or_else(|| id.clone());
                Ok(CardAction { id, label })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        Ok(Self {
            title: raw.title,
            body: raw.body,
            actions,
            auto_close: raw
                .auto_close_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_full_card() {
        let card = CardConfig::parse(&json!({
            "title": "Update ready",
            "body": "Restart to apply",
            "actions": [{"id": "restart", "label": "Restart"}, {"id": "later", "label": "Later"}],
            "auto_close_ms": 5000
        }))
        .unwrap();

        assert_eq!(card.title.as_deref(), Some("Update ready"));
        assert_eq!(card.body.as_deref(), Some("Restart to apply"));
        assert_eq!(card.actions.len(), 2);
        assert_eq!(card.actions[1], CardAction::new("later", "Later"));
        assert_eq!(card.auto_close, Some(Duration::from_millis(5000)));
    }

    #[test]
    fn parse_empty_card() {
        let card = CardConfig::parse(&json!({})).unwrap();
        assert_eq!(card, CardConfig::default());
    }

    #[test]
    fn zero_auto_close_means_none() {
        let card = CardConfig::parse(&json!({"auto_close_ms": 0})).unwrap();
        assert!(card.auto_close.is_none());
    }

    #[test]
    fn action_label_defaults_to_id() {
        let card = CardConfig::parse(&json!({"actions": [{"id": "ok"}]})).unwrap();
        assert_eq!(card.actions[0].label, "ok");
    }

    #[test]
    fn action_without_id_is_malformed() {
        let err = CardConfig::parse(&json!({"actions": [{"id": "a"}, {"label": "B"}]})).unwrap_err();
        assert_eq!(err.to_string(), "card action at actions[1] is missing an id");
    }

    #[test]
    fn negative_auto_close_is_rejected() {
        assert!(matches!(
            CardConfig::parse(&json!({"auto_close_ms": -5})),
            Err(ModelError::Json(_))
        ));
    }

    #[test]
    fn builder_and_lookup() {
        let card = CardConfig::new()
            .title("Hi")
            .action("yes", "Yes")
            .action("no", "No")
            .auto_close(Duration::from_secs(2));
        assert_eq!(card.find_action("no").map(|a| a.label.as_str()), Some("No"));
        assert!(card.find_action("maybe").is_none());
        assert_eq!(card.auto_close, Some(Duration::from_secs(2)));
    }
}
