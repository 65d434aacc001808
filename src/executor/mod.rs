// Executor module - hands plays to the automation engine

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use zeroize::Zeroizing;

use crate::inventory::Inventory;
use crate::output::errors::ActionError;
use crate::playbook::Play;

pub mod events;
pub mod runner;
#[cfg(test)]
pub mod scripted;

pub use events::RunnerEvent;
pub use runner::AnsibleRunner;

/// Everything the engine needs for one run
#[derive(Clone)]
pub struct RunRequest {
    pub play: Play,
    pub inventory: Inventory,
    /// Private key used for SSH authentication
    pub ssh_key: Option<Zeroizing<String>>,
    /// Overall job timeout, enforced by the engine
    pub timeout: Option<Duration>,
    /// Keep the engine's own console output off our streams
    pub quiet: bool,
}

impl RunRequest {
    pub fn new(play: Play, inventory: Inventory) -> Self {
        RunRequest {
            play,
            inventory,
            ssh_key: None,
            timeout: None,
            quiet: true,
        }
    }

    pub fn ssh_key(mut self, key: Option<Zeroizing<String>>) -> Self {
        self.ssh_key = key;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRequest")
            .field("play", &self.play)
            .field("inventory", &self.inventory)
            .field("ssh_key", &self.ssh_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("quiet", &self.quiet)
            .finish()
    }
}

/// How the engine process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Successful,
    Failed { rc: Option<i32> },
    TimedOut,
}

impl RunStatus {
    /// Map an engine exit code; 254 is what ansible-runner reports on job timeout
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => RunStatus::Successful,
            Some(254) => RunStatus::TimedOut,
            rc => RunStatus::Failed { rc },
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Successful => write!(f, "successful"),
            RunStatus::Failed { rc: Some(rc) } => write!(f, "failed (rc={})", rc),
            RunStatus::Failed { rc: None } => write!(f, "failed (killed by signal)"),
            RunStatus::TimedOut => write!(f, "timeout"),
        }
    }
}

/// A run in progress: events stream in while the engine works
pub struct RunHandle {
    events: mpsc::UnboundedReceiver<RunnerEvent>,
    completion: JoinHandle<Result<RunStatus, ActionError>>,
}

impl RunHandle {
    pub fn new(
        events: mpsc::UnboundedReceiver<RunnerEvent>,
        completion: JoinHandle<Result<RunStatus, ActionError>>,
    ) -> Self {
        RunHandle { events, completion }
    }

    /// Next event, or `None` once the engine has closed its output
    pub async fn next_event(&mut self) -> Option<RunnerEvent> {
        self.events.recv().await
    }

    /// Wait for the engine to exit
    pub async fn wait(self) -> Result<RunStatus, ActionError> {
        self.completion.await.map_err(|e| ActionError::Runner {
            message: format!("Run supervisor task failed: {}", e),
            suggestion: None,
        })?
    }
}

/// Result of a blocking run
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub events: Vec<RunnerEvent>,
    /// Recap counters from the `playbook_on_stats` event
    pub stats: Option<Value>,
    pub status: RunStatus,
}

/// The automation engine seam
#[async_trait]
pub trait PlaybookRunner: Send + Sync {
    /// Start a run and stream its events
    async fn run_async(&self, request: RunRequest) -> Result<RunHandle, ActionError>;

    /// Run to completion and collect every event
    async fn run(&self, request: RunRequest) -> Result<RunResponse, ActionError> {
        let mut handle = self.run_async(request).await?;

        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
        let status = handle.wait().await?;
        let stats = events.iter().rev().find_map(RunnerEvent::stats);

        Ok(RunResponse {
            events,
            stats,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::scripted::ScriptedRunner;
    use serde_json::json;

    #[test]
    fn test_status_from_exit_code() {
        assert_eq!(RunStatus::from_exit_code(Some(0)), RunStatus::Successful);
        assert_eq!(RunStatus::from_exit_code(Some(254)), RunStatus::TimedOut);
        assert_eq!(
            RunStatus::from_exit_code(Some(2)),
            RunStatus::Failed { rc: Some(2) }
        );
        assert_eq!(RunStatus::from_exit_code(None).to_string(), "failed (killed by signal)");
    }

    #[test]
    fn test_debug_hides_key() {
        let request = RunRequest::new(Play::new("a"), Inventory::localhost("a"))
            .ssh_key(Some(Zeroizing::new("PRIVATE".to_string())));
        let debug = format!("{:?}", request);
        assert!(!debug.contains("PRIVATE"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_blocking_run_collects_events_and_stats() {
        let runner = ScriptedRunner::new().then(vec![
            RunnerEvent::new("runner_on_ok", json!({"host": "web01"})),
            RunnerEvent::new("playbook_on_stats", json!({"ok": {"web01": 1}})),
        ]);

        let response = runner
            .run(RunRequest::new(Play::new("a"), Inventory::localhost("a")))
            .await
            .unwrap();

        assert_eq!(response.events.len(), 2);
        assert_eq!(response.stats.unwrap()["ok"]["web01"], json!(1));
        assert_eq!(response.status, RunStatus::Successful);
    }
}
