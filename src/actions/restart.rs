// RESTART mode: drive a systemd unit on the alerting hosts over SSH

use std::time::Duration;

use serde_yaml::Value;

use super::{ActionContext, ActionPlan, Submission};
use crate::executor::RunRequest;
use crate::inventory::Inventory;
use crate::output::errors::ActionError;
use crate::payload::Configuration;
use crate::playbook::{args, Play, Task};

pub const GROUP: &str = "a";
pub const RUN_TIMEOUT: Duration = Duration::from_secs(90);

/// `systemd` task setting `unit` to `state` without waiting on the job
pub fn task(unit: &str, state: &str) -> Task {
    Task::new(
        "alert action: restart",
        "systemd",
        args([
            ("name", Value::from(unit)),
            ("state", Value::from(state)),
            ("no_block", Value::from(true)),
        ]),
    )
    .become_root()
}

pub async fn plan(config: &Configuration, ctx: &ActionContext<'_>) -> Result<ActionPlan, ActionError> {
    tracing::info!("Running RESTART task");

    let hosts = config.hosts()?;
    let play = Play::new(GROUP).task(task(
        config.require("target")?,
        config.require("systemctlAction")?,
    ));
    let ssh_key = ctx.ssh_key(config).await?;

    tracing::debug!("{}", play.to_json());
    tracing::debug!("{}", hosts.join("\n"));

    Ok(ActionPlan {
        request: RunRequest::new(play, Inventory::new(GROUP, hosts))
            .ssh_key(ssh_key)
            .timeout(RUN_TIMEOUT),
        submission: Submission::Blocking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::*;
    use crate::actions::{dispatch, Mode, ReturnCode};
    use crate::executor::scripted::ScriptedRunner;
    use serde_json::json;

    fn restart_config() -> Configuration {
        config(json!({
            "hosts": "web01,web02",
            "target": "nginx",
            "systemctlAction": "restarted",
            "ssmSshKey": "/ops/ssh/web",
        }))
    }

    #[test]
    fn test_task_shape() {
        let task = task("nginx", "restarted");
        let systemd = task.args("systemd").unwrap();

        assert_eq!(systemd.get("name"), Some(&Value::from("nginx")));
        assert_eq!(systemd.get("state"), Some(&Value::from("restarted")));
        assert_eq!(systemd.get("no_block"), Some(&Value::from(true)));
        assert_eq!(task.sudo, Some(true));
        assert_eq!(task.become_user.as_deref(), Some("root"));
    }

    #[tokio::test]
    async fn test_plan_uses_host_inventory_and_key() {
        let runner = ScriptedRunner::new().then(key_lookup_events("KEYDATA"));
        let plan = plan(&restart_config(), &ctx(&runner)).await.unwrap();

        assert_eq!(plan.submission, Submission::Blocking);
        assert_eq!(plan.request.inventory.to_ini(), "[a]\nweb01\nweb02\n");
        assert_eq!(plan.request.ssh_key.as_ref().unwrap().as_str(), "KEYDATA\n");
        assert_eq!(plan.request.timeout, Some(Duration::from_secs(90)));
        assert!(plan.request.play.connection.is_none());
        assert!(plan.request.play.gather_facts.is_none());
    }

    #[tokio::test]
    async fn test_missing_target_skips_key_lookup() {
        let runner = ScriptedRunner::new();
        let cfg = config(json!({"hosts": "web01", "ssmSshKey": "/ops/ssh/web"}));

        let err = plan(&cfg, &ctx(&runner)).await.unwrap_err();
        assert!(matches!(err, ActionError::MissingKey { ref key } if key == "target"));
        assert!(runner.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let runner = ScriptedRunner::new()
            .then(key_lookup_events("KEYDATA"))
            .then(vec![ok("web01"), ok("web02")]);

        let code = dispatch(Mode::Restart, &restart_config(), &ctx(&runner)).await;
        assert_eq!(code, ReturnCode::Success);

        let recorded = runner.recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].request.play.hosts, "single");
        assert_eq!(recorded[1].request.play.hosts, "a");
        assert!(!recorded[1].background);
    }

    #[tokio::test]
    async fn test_missing_secret_passes_through() {
        let runner = ScriptedRunner::new()
            .then(vec![failed("localhost")])
            .then(vec![failed("web01")]);

        let code = dispatch(Mode::Restart, &restart_config(), &ctx(&runner)).await;

        assert_eq!(code, ReturnCode::Failure);
        let recorded = runner.recorded();
        assert_eq!(recorded.len(), 2);
        assert!(recorded[1].request.ssh_key.is_none());
    }
}
