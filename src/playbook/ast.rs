// Play and task types rendered into the engine's playbook format

use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// A single play: target group, connection settings and the tasks to run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Play {
    pub hosts: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gather_facts: Option<bool>,

    /// Connection plugin (`local`, `ssh`, ...); unset means the engine default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,

    /// Play keywords not modelled above, in the order they were supplied
    #[serde(flatten)]
    pub extra: Mapping,

    pub tasks: Vec<PlayTask>,
}

/// A task built here or one supplied verbatim by the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlayTask {
    Built(Task),
    Raw(Value),
}

/// A task invoking one module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub name: String,

    /// `{module_name: {arg: value, ...}}`
    #[serde(flatten)]
    pub module: Mapping,

    /// Privilege escalation
    #[serde(rename = "become", skip_serializing_if = "Option::is_none")]
    pub sudo: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub become_user: Option<String>,

    /// Loop items; the task runs once per entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_items: Option<Vec<String>>,
}

impl Play {
    pub fn new(hosts: impl Into<String>) -> Self {
        Play {
            hosts: hosts.into(),
            gather_facts: None,
            connection: None,
            extra: Mapping::new(),
            tasks: Vec::new(),
        }
    }

    pub fn gather_facts(mut self, gather: bool) -> Self {
        self.gather_facts = Some(gather);
        self
    }

    pub fn connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(PlayTask::Built(task));
        self
    }

    /// Render as a one-play playbook document
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&[self])
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"hosts\":\"{}\"}}", self.hosts))
    }
}

impl Task {
    pub fn new(name: impl Into<String>, module: &str, args: Mapping) -> Self {
        let mut call = Mapping::new();
        call.insert(Value::from(module), Value::Mapping(args));

        Task {
            name: name.into(),
            module: call,
            sudo: None,
            become_user: None,
            with_items: None,
        }
    }

    /// Run the task as root through privilege escalation
    pub fn become_root(mut self) -> Self {
        self.sudo = Some(true);
        self.become_user = Some("root".to_string());
        self
    }

    pub fn with_items(mut self, items: Vec<String>) -> Self {
        self.with_items = Some(items);
        self
    }

    /// Arguments passed to the named module
    pub fn args(&self, module: &str) -> Option<&Mapping> {
        self.module.get(module)?.as_mapping()
    }
}

/// Build a module argument mapping from key/value pairs
pub fn args<const N: usize>(entries: [(&str, Value); N]) -> Mapping {
    entries
        .into_iter()
        .map(|(k, v)| (Value::from(k), v))
        .collect()
}
