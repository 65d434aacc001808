// Alert payload read from standard input

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::output::errors::ActionError;

/// Keys whose values never reach the log
const REDACTED_KEYS: &[&str] = &["restPass"];

/// The document the alerting tool writes to stdin
#[derive(Debug, Clone, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub configuration: Configuration,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Payload {
    pub fn from_json(input: &str) -> Result<Self, ActionError> {
        Ok(serde_json::from_str(input)?)
    }

    /// JSON rendering for the log, with secrets masked
    pub fn redacted_json(&self) -> String {
        let mut doc = self.extra.clone();
        doc.insert(
            "configuration".to_string(),
            Value::Object(self.configuration.redacted()),
        );
        Value::Object(doc).to_string()
    }
}

/// Mode-specific key/value settings from the payload's `configuration` block
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Map<String, Value>);

impl Configuration {
    /// A key that must be present and non-empty
    pub fn require(&self, key: &str) -> Result<&str, ActionError> {
        self.optional(key)?.ok_or_else(|| ActionError::missing(key))
    }

    /// A key that may be absent; empty strings and nulls count as absent
    pub fn optional(&self, key: &str) -> Result<Option<&str>, ActionError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(ActionError::invalid(
                key,
                format!("expected a string, found {}", json_type(other)),
            )),
        }
    }

    pub fn optional_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, ActionError> {
        Ok(self.optional(key)?.unwrap_or(default))
    }

    /// The comma-separated `hosts` key as a list
    pub fn hosts(&self) -> Result<Vec<String>, ActionError> {
        let hosts: Vec<String> = self
            .require("hosts")?
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from)
            .collect();

        if hosts.is_empty() {
            return Err(ActionError::missing("hosts"));
        }
        Ok(hosts)
    }

    fn redacted(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(k, v)| {
                if REDACTED_KEYS.contains(&k.as_str()) && !v.is_null() {
                    (k.clone(), Value::String("********".to_string()))
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect()
    }
}

impl From<Map<String, Value>> for Configuration {
    fn from(map: Map<String, Value>) -> Self {
        Configuration(map)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> Configuration {
        Payload::from_json(json).unwrap().configuration
    }

    #[test]
    fn test_require_and_optional() {
        let cfg = config(r#"{"configuration": {"restUrl": "https://x", "restUser": ""}}"#);

        assert_eq!(cfg.require("restUrl").unwrap(), "https://x");
        assert_eq!(cfg.optional("restUser").unwrap(), None);
        assert_eq!(cfg.optional_or("httpVerb", "GET").unwrap(), "GET");

        let err = cfg.require("hosts").unwrap_err();
        assert!(matches!(err, ActionError::MissingKey { ref key } if key == "hosts"));
    }

    #[test]
    fn test_non_string_value_is_rejected() {
        let cfg = config(r#"{"configuration": {"hosts": 5}}"#);
        let err = cfg.require("hosts").unwrap_err();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn test_hosts_split() {
        let cfg = config(r#"{"configuration": {"hosts": "web01, web02,,db01"}}"#);
        assert_eq!(cfg.hosts().unwrap(), vec!["web01", "web02", "db01"]);

        let cfg = config(r#"{"configuration": {"hosts": " , "}}"#);
        assert!(cfg.hosts().is_err());
    }

    #[test]
    fn test_missing_configuration_block() {
        let payload = Payload::from_json(r#"{"sid": "scheduler__admin"}"#).unwrap();
        assert!(payload.configuration.require("hosts").is_err());
        assert!(payload.redacted_json().contains("scheduler__admin"));
    }

    #[test]
    fn test_redacted_json_masks_password() {
        let payload = Payload::from_json(
            r#"{"search_name": "disk full", "configuration": {"restPass": "hunter2", "restUser": "ops"}}"#,
        )
        .unwrap();
        let logged = payload.redacted_json();
        assert!(!logged.contains("hunter2"));
        assert!(logged.contains("\"restUser\":\"ops\""));
        assert!(logged.contains("disk full"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Payload::from_json("configuration"),
            Err(ActionError::Payload(_))
        ));
    }
}
