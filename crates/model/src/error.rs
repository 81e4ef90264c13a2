//! Model error types.

/// Errors produced while parsing host payloads into model types.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("menu item at {path} is missing an id")]
    MalformedMenu { path: String },

    #[error("card action at {path} is missing an id")]
    MalformedCard { path: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
