// Alert actions: one plan builder per mode, one shared execution path

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::Level;

use crate::executor::{PlaybookRunner, RunRequest, RunStatus, RunnerEvent};
use crate::output::errors::ActionError;
use crate::output::relay::log_event;
use crate::payload::Configuration;
use crate::secrets;

pub mod adhoc;
pub mod reboot;
pub mod rest;
pub mod restart;

/// Remediation mode selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Call an HTTP endpoint from the controller
    Rest,
    /// Change a systemd unit's state on the target hosts
    Restart,
    /// Reboot the target hosts
    Reboot,
    /// Run caller-supplied tasks
    Adhoc,
}

impl Mode {
    pub const NAMES: [&'static str; 4] = ["REST", "RESTART", "REBOOT", "ADHOC"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Rest => "REST",
            Mode::Restart => "RESTART",
            Mode::Reboot => "REBOOT",
            Mode::Adhoc => "ADHOC",
        }
    }
}

impl FromStr for Mode {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REST" => Ok(Mode::Rest),
            "RESTART" => Ok(Mode::Restart),
            "REBOOT" => Ok(Mode::Reboot),
            "ADHOC" => Ok(Mode::Adhoc),
            other => Err(ActionError::invalid(
                "mode",
                format!("unknown mode '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process exit status reported back to the alerting tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Success,
    Failure,
}

impl ReturnCode {
    pub fn code(self) -> i32 {
        match self {
            ReturnCode::Success => 0,
            ReturnCode::Failure => 1,
        }
    }
}

/// How a plan is handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Wait for the run, then walk its events
    Blocking,
    /// Start the run and walk events as they stream in
    Background,
}

/// A run ready to submit
#[derive(Debug, Clone)]
pub struct ActionPlan {
    pub request: RunRequest,
    pub submission: Submission,
}

/// Shared collaborators for every mode
pub struct ActionContext<'a> {
    pub runner: &'a dyn PlaybookRunner,
    pub ssm_region: String,
}

impl ActionContext<'_> {
    /// Retrieve the SSH key named by `ssmSshKey`
    pub async fn ssh_key(
        &self,
        config: &Configuration,
    ) -> Result<Option<zeroize::Zeroizing<String>>, ActionError> {
        let name = config.require("ssmSshKey")?;
        Ok(secrets::fetch_ssh_key(self.runner, name, &self.ssm_region).await)
    }
}

/// Walks a run's events: relays task outcomes and watches for failures
#[derive(Debug, Default)]
pub struct EventScan {
    failed: bool,
    stats: Option<Value>,
}

impl EventScan {
    pub fn observe(&mut self, event: &RunnerEvent) {
        tracing::debug!("{}", event.to_json());

        if event.is_runner_event() {
            log_event(event, Level::INFO);
        }
        // Never cleared: one failure pins the run as failed
        if event.is_failure() {
            self.failed = true;
        }
        if let Some(stats) = event.stats() {
            self.stats = Some(stats);
        }
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn finish(self, status: RunStatus) -> ReturnCode {
        let stats = self.stats.unwrap_or(Value::Null);
        tracing::info!("Stats: {}", stats);
        tracing::info!("Runner status: {}", status);

        if self.failed {
            ReturnCode::Failure
        } else {
            ReturnCode::Success
        }
    }
}

/// Submit a plan and turn its events into a return code
pub async fn execute(
    runner: &dyn PlaybookRunner,
    plan: ActionPlan,
) -> Result<ReturnCode, ActionError> {
    let mut scan = EventScan::default();

    let status = match plan.submission {
        Submission::Blocking => {
            let response = runner.run(plan.request).await?;
            for event in &response.events {
                scan.observe(event);
            }
            response.status
        }
        Submission::Background => {
            let mut handle = runner.run_async(plan.request).await?;
            while let Some(event) = handle.next_event().await {
                scan.observe(&event);
            }
            handle.wait().await?
        }
    };

    Ok(scan.finish(status))
}

async fn build_plan(
    mode: Mode,
    config: &Configuration,
    ctx: &ActionContext<'_>,
) -> Result<ActionPlan, ActionError> {
    match mode {
        Mode::Rest => rest::plan(config),
        Mode::Restart => restart::plan(config, ctx).await,
        Mode::Reboot => reboot::plan(config, ctx).await,
        Mode::Adhoc => adhoc::plan(config, ctx).await,
    }
}

/// Run `mode` against `config`. Errors are logged and reported as a failure.
pub async fn dispatch(mode: Mode, config: &Configuration, ctx: &ActionContext<'_>) -> ReturnCode {
    let result = match build_plan(mode, config, ctx).await {
        Ok(plan) => execute(ctx.runner, plan).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{} action failed: {}", mode, e);
            if let Some(hint) = e.hint() {
                tracing::error!("Hint: {}", hint);
            }
            ReturnCode::Failure
        }
    }
}
