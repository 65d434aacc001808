// ADHOC mode: caller-supplied tasks, optionally with play keywords

use std::time::Duration;

use super::{ActionContext, ActionPlan, Submission};
use crate::executor::RunRequest;
use crate::inventory::Inventory;
use crate::output::errors::ActionError;
use crate::payload::Configuration;
use crate::playbook::{parse_play_fragment, parse_task_list, Play};

pub const GROUP: &str = "alertHosts";
pub const RUN_TIMEOUT: Duration = Duration::from_secs(180);
pub const DEFAULT_EXEC_LOCATION: &str = "local";

/// Defaults, then the `play` fragment, then `execLocation` and `tasks`
pub fn build_play(config: &Configuration) -> Result<Play, ActionError> {
    let mut play = Play::new(GROUP).gather_facts(false);

    if let Some(fragment) = config.optional("play")? {
        play.overlay(parse_play_fragment("play", fragment)?)?;
    }
    if play.hosts != GROUP {
        tracing::warn!(
            "play targets '{}' but the inventory group is '{}'; no hosts will match",
            play.hosts,
            GROUP
        );
    }

    play.connection = Some(
        config
            .optional_or("execLocation", DEFAULT_EXEC_LOCATION)?
            .to_string(),
    );
    play.tasks = parse_task_list("tasks", config.require("tasks")?)?;

    Ok(play)
}

pub async fn plan(config: &Configuration, ctx: &ActionContext<'_>) -> Result<ActionPlan, ActionError> {
    tracing::info!("Running ADHOC task");

    let hosts = config.hosts()?;
    let play = build_play(config)?;
    let ssh_key = ctx.ssh_key(config).await?;

    tracing::debug!("{}", play.to_json());
    tracing::debug!("{}", hosts.join("\n"));

    Ok(ActionPlan {
        request: RunRequest::new(play, Inventory::new(GROUP, hosts))
            .ssh_key(ssh_key)
            .timeout(RUN_TIMEOUT),
        submission: Submission::Background,
    })
}
