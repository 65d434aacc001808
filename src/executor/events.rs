// Events emitted by the automation engine during a run

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event type reported for a task that succeeded on a host
pub const RUNNER_ON_OK: &str = "runner_on_ok";

/// Event type reported for a task that failed on a host
pub const RUNNER_ON_FAILED: &str = "runner_on_failed";

/// Event type carrying the aggregate recap of the run
pub const PLAYBOOK_ON_STATS: &str = "playbook_on_stats";

const STATS_KEYS: &[&str] = &[
    "ok", "changed", "failures", "dark", "skipped", "ignored", "rescued", "processed",
];

/// One event record as the engine emits it in JSON mode.
///
/// Only `event` and `event_data` are interpreted; every other field
/// (`uuid`, `counter`, `stdout`, ...) is carried along untouched so the
/// audit log sees the record as the engine produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerEvent {
    pub event: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub event_data: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunnerEvent {
    pub fn new(event: impl Into<String>, event_data: Value) -> Self {
        RunnerEvent {
            event: event.into(),
            event_data,
            extra: Map::new(),
        }
    }

    /// Per-host task outcome events (`runner_on_ok`, `runner_on_failed`, ...)
    pub fn is_runner_event(&self) -> bool {
        self.event.starts_with("runner_on")
    }

    pub fn is_failure(&self) -> bool {
        self.event == RUNNER_ON_FAILED
    }

    pub fn is_ok(&self) -> bool {
        self.event == RUNNER_ON_OK
    }

    /// Task result payload (`event_data.res`)
    pub fn result(&self) -> Option<&Value> {
        self.event_data.get("res")
    }

    /// Facts set or gathered by the task (`event_data.res.ansible_facts`)
    pub fn facts(&self) -> Option<&Map<String, Value>> {
        self.result()?.get("ansible_facts")?.as_object()
    }

    /// Copy of this event with the gathered-facts block removed
    pub fn without_facts(&self) -> RunnerEvent {
        let mut event = self.clone();
        if let Some(res) = event
            .event_data
            .get_mut("res")
            .and_then(Value::as_object_mut)
        {
            res.remove("ansible_facts");
        }
        event
    }

    /// Recap counters when this is the `playbook_on_stats` event
    pub fn stats(&self) -> Option<Value> {
        if self.event != PLAYBOOK_ON_STATS {
            return None;
        }
        let data = self.event_data.as_object()?;
        let stats: Map<String, Value> = STATS_KEYS
            .iter()
            .filter_map(|key| data.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect();
        Some(Value::Object(stats))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"event\":\"{}\"}}", self.event))
    }
}
