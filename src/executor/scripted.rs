// Scripted engine double: replays canned event streams and records requests

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{PlaybookRunner, RunHandle, RunRequest, RunStatus, RunnerEvent};
use crate::output::errors::ActionError;

/// A request as the runner saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub request: RunRequest,
    pub background: bool,
}

#[derive(Default)]
pub struct ScriptedRunner {
    scripts: Mutex<VecDeque<Vec<RunnerEvent>>>,
    recorded: Mutex<Vec<Recorded>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the events the next run will emit
    pub fn then(self, events: Vec<RunnerEvent>) -> Self {
        self.scripts.lock().push_back(events);
        self
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().clone()
    }

    fn replay(&self, request: RunRequest, background: bool) -> RunHandle {
        self.recorded.lock().push(Recorded {
            request,
            background,
        });
        let events = self.scripts.lock().pop_front().unwrap_or_default();

        let (tx, rx) = mpsc::unbounded_channel();
        for event in events {
            let _ = tx.send(event);
        }
        drop(tx);

        RunHandle::new(rx, tokio::spawn(async { Ok::<_, ActionError>(RunStatus::Successful) }))
    }
}

#[async_trait]
impl PlaybookRunner for ScriptedRunner {
    async fn run_async(&self, request: RunRequest) -> Result<RunHandle, ActionError> {
        Ok(self.replay(request, true))
    }

    async fn run(&self, request: RunRequest) -> Result<super::RunResponse, ActionError> {
        let mut handle = self.replay(request, false);
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
        let status = handle.wait().await?;
        let stats = events.iter().rev().find_map(RunnerEvent::stats);
        Ok(super::RunResponse {
            events,
            stats,
            status,
        })
    }
}
