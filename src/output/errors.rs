// Error types for alert actions

use std::path::PathBuf;

use thiserror::Error;

/// All error types raised while turning a payload into a run
#[derive(Debug, Error)]
pub enum ActionError {
    /// A configuration key the mode needs is missing or empty
    #[error("configuration key '{key}' is required")]
    MissingKey { key: String },

    /// A configuration key is present but unusable
    #[error("configuration key '{key}' is invalid: {message}")]
    InvalidValue { key: String, message: String },

    /// Standard input did not hold a usable payload document
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Caller-supplied YAML (a play fragment or a task list) did not parse
    #[error("invalid YAML in '{key}': {source}")]
    Yaml {
        key: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The automation engine could not be started or waited on
    #[error("runner failure: {message}")]
    Runner {
        message: String,
        suggestion: Option<String>,
    },

    /// Filesystem errors while staging a run
    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
    },
}

impl ActionError {
    pub fn missing(key: impl Into<String>) -> Self {
        ActionError::MissingKey { key: key.into() }
    }

    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ActionError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ActionError::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Suggest a fix for the operator reading the log
    pub fn hint(&self) -> Option<String> {
        match self {
            ActionError::MissingKey { key } => Some(format!(
                "Add '{}' to the alert action's configuration block",
                key
            )),
            ActionError::InvalidValue { .. } => None,
            ActionError::Payload(_) => {
                Some("Expected a JSON document like {\"configuration\": {...}} on stdin".to_string())
            }
            ActionError::Yaml { key, .. } => Some(format!(
                "Check the indentation of '{}'; it must be a YAML document",
                key
            )),
            ActionError::Runner { suggestion, .. } => suggestion.clone(),
            ActionError::Io { path, .. } => path
                .as_ref()
                .map(|p| format!("Check permissions on {}", p.display())),
        }
    }
}
