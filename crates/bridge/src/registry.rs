//! Name → handler action registry.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::{Map, Value};

use crate::BridgeError;
use crate::result::ActionResult;

/// A boxed future returned by action handlers.
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<Option<Value>, BridgeError>> + Send>>;

/// An action handler: takes the call arguments, resolves to optional data.
pub type ActionHandler = Arc<dyn Fn(Value) -> ActionFuture + Send + Sync>;

/// Registry of named actions.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: HashMap<String, ActionHandler>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, replacing any previous handler.
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, BridgeError>> + Send + 'static,
    {
        let handler: ActionHandler =
            Arc::new(move |args: Value| -> ActionFuture { Box::pin(handler(args)) });
        self.handlers.insert(name.into(), handler);
    }

    /// Makes `alias` call the handler registered as `target`.
    ///
    /// Returns `false` if `target` is not registered.
    pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> bool {
        match self.handlers.get(target).cloned() {
            Some(handler) => {
                self.handlers.insert(alias.into(), handler);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Runs the action `name`.
    ///
    /// Never fails: unknown names, handler errors and handler panics all come
    /// back as error results. `null` arguments are treated as `{}`.
    pub async fn dispatch(&self, name: &str, args: Value) -> ActionResult {
        let Some(handler) = self.handlers.get(name) else {
            tracing::warn!(action = %name, "unknown action");
            return ActionResult::error(BridgeError::UnknownAction(name.to_string()).to_string());
        };

        let args = match args {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        tracing::debug!(action = %name, "dispatching action");
        let outcome = match std::panic::catch_unwind(AssertUnwindSafe(|| handler(args))) {
            Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
            Err(panic) => Err(panic),
        };

        match outcome {
            Ok(Ok(Some(data))) => ActionResult::success_with(data),
            Ok(Ok(None)) => ActionResult::success(),
            Ok(Err(e)) => {
                tracing::warn!(action = %name, error = %e, "action failed");
                ActionResult::error(e.to_string())
            }
            Err(_) => {
                let e = BridgeError::Panicked(name.to_string());
                tracing::error!(action = %name, "{e}");
                ActionResult::error(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        registry.register("echo", |args| async move { Ok(Some(args)) });
        registry.register("nothing", |_| async { Ok(None) });
        registry.register("fail", |_| async {
            Err(BridgeError::Args {
                action: "fail",
                source: serde_json::from_str::<Value>("{").unwrap_err(),
            })
        });
        registry.register("boom", |_| async {
            if true {
                panic!("handler blew up");
            }
            Ok(None)
        });
        registry
    }

    #[tokio::test]
    async fn unknown_action_is_an_error_result() {
        let result = registry().dispatch("frobnicate", json!({})).await;
        assert_eq!(result, ActionResult::error("Unknown action: frobnicate"));
    }

    #[tokio::test]
    async fn handler_data_is_returned() {
        let result = registry().dispatch("echo", json!({"a": 1})).await;
        assert_eq!(result, ActionResult::success_with(json!({"a": 1})));

        let result = registry().dispatch("nothing", json!({})).await;
        assert_eq!(result, ActionResult::success());
    }

    #[tokio::test]
    async fn null_args_become_empty_object() {
        let result = registry().dispatch("echo", Value::Null).await;
        assert_eq!(result.data, Some(json!({})));
    }

    #[tokio::test]
    async fn handler_error_becomes_error_result() {
        let result = registry().dispatch("fail", json!({})).await;
        assert!(!result.ok);
        assert!(result.error.unwrap().starts_with("fail failed: invalid arguments"));
    }

    #[tokio::test]
    async fn handler_panic_becomes_error_result() {
        let result = registry().dispatch("boom", json!({})).await;
        assert_eq!(result, ActionResult::error("action 'boom' panicked"));
    }

    #[tokio::test]
    async fn alias_routes_to_target() {
        let mut registry = registry();
        assert!(registry.alias("legacyEcho", "echo"));
        assert!(!registry.alias("ghost", "missing"));

        let result = registry.dispatch("legacyEcho", json!("hi")).await;
        assert_eq!(result.data, Some(json!("hi")));
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn names_are_sorted() {
        assert_eq!(registry().names(), vec!["boom", "echo", "fail", "nothing"]);
    }
}
