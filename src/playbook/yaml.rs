// Parsing of caller-supplied playbook fragments

use serde_yaml::{Mapping, Value};

use super::ast::{Play, PlayTask};
use crate::output::errors::ActionError;

/// Parse a YAML document from configuration key `key`
fn parse_document(key: &str, text: &str) -> Result<Value, ActionError> {
    serde_yaml::from_str(text).map_err(|source| ActionError::Yaml {
        key: key.to_string(),
        source,
    })
}

/// Parse a play fragment; it has to be a mapping of play keywords
pub fn parse_play_fragment(key: &str, text: &str) -> Result<Mapping, ActionError> {
    match parse_document(key, text)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ActionError::invalid(key, "expected a mapping of play keywords")),
    }
}

/// Parse a task list. A single task mapping is accepted and wrapped.
pub fn parse_task_list(key: &str, text: &str) -> Result<Vec<PlayTask>, ActionError> {
    match parse_document(key, text)? {
        Value::Sequence(tasks) => Ok(tasks.into_iter().map(PlayTask::Raw).collect()),
        task @ Value::Mapping(_) => Ok(vec![PlayTask::Raw(task)]),
        _ => Err(ActionError::invalid(key, "expected a list of tasks")),
    }
}

impl Play {
    /// Lay `fragment` over this play; fragment keys win on collision
    pub fn overlay(&mut self, fragment: Mapping) -> Result<(), ActionError> {
        for (key, value) in fragment {
            match key.as_str() {
                Some("hosts") => {
                    self.hosts = scalar_string(&value)
                        .ok_or_else(|| ActionError::invalid("play", "'hosts' must be a string"))?;
                }
                Some("gather_facts") => {
                    if value.as_str().is_some_and(|s| s.contains("{{")) {
                        // Left for the engine to template
                        self.gather_facts = None;
                        self.extra.insert(key, value);
                    } else if value.is_null() {
                        self.gather_facts = None;
                    } else {
                        let gather = engine_bool(&value).ok_or_else(|| {
                            ActionError::invalid("play", "'gather_facts' must be a boolean")
                        })?;
                        self.gather_facts = Some(gather);
                    }
                }
                Some("connection") => {
                    self.connection = scalar_string(&value);
                }
                Some("tasks") => {
                    self.tasks = match value {
                        Value::Sequence(tasks) => tasks.into_iter().map(PlayTask::Raw).collect(),
                        Value::Null => Vec::new(),
                        _ => return Err(ActionError::invalid("play", "'tasks' must be a list")),
                    };
                }
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
        Ok(())
    }
}

/// Boolean as the engine reads it: YAML booleans plus `yes`/`no`, `on`/`off`,
/// `true`/`false` and `1`/`0` in any case.
fn engine_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "on" | "true" | "y" | "1" => Some(true),
            "no" | "off" | "false" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
