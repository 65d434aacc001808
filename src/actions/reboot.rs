// REBOOT mode

use std::time::Duration;

use serde_yaml::Value;

use super::{ActionContext, ActionPlan, Submission};
use crate::executor::RunRequest;
use crate::inventory::Inventory;
use crate::output::errors::ActionError;
use crate::payload::Configuration;
use crate::playbook::{args, Play, Task};

pub const GROUP: &str = "a";
pub const RUN_TIMEOUT: Duration = Duration::from_secs(180);
pub const REBOOT_TIMEOUT_SECS: u64 = 90;
pub const REBOOT_MESSAGE: &str = "reboot via alert action";

pub fn task() -> Task {
    Task::new(
        "alert action: reboot",
        "reboot",
        args([
            ("reboot_timeout", Value::from(REBOOT_TIMEOUT_SECS)),
            ("msg", Value::from(REBOOT_MESSAGE)),
        ]),
    )
    .become_root()
}

pub async fn plan(config: &Configuration, ctx: &ActionContext<'_>) -> Result<ActionPlan, ActionError> {
    tracing::info!("Running REBOOT task");

    let hosts = config.hosts()?;
    let ssh_key = ctx.ssh_key(config).await?;

    let play = Play::new(GROUP).task(task());
    tracing::debug!("{}", play.to_json());
    tracing::debug!("{}", hosts.join("\n"));

    Ok(ActionPlan {
        request: RunRequest::new(play, Inventory::new(GROUP, hosts))
            .ssh_key(ssh_key)
            .timeout(RUN_TIMEOUT),
        submission: Submission::Background,
    })
}
