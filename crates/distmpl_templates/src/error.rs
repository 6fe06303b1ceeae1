//! Error types for template processing.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while processing templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Template rendering failed for {template}: {message}")]
    Render { template: String, message: String },

    #[error("Core error: {0}")]
    Core(#[from] distmpl_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TemplateError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
