// REST mode: call an HTTP endpoint from the controller, once per alerting host

use std::time::Duration;

use serde_yaml::Value;

use super::{ActionPlan, Submission};
use crate::executor::RunRequest;
use crate::inventory::Inventory;
use crate::output::errors::ActionError;
use crate::payload::Configuration;
use crate::playbook::{args, Play, PlayTask, Task};

pub const GROUP: &str = "a";
pub const RUN_TIMEOUT: Duration = Duration::from_secs(90);
pub const REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_METHOD: &str = "GET";

pub fn task(config: &Configuration, hosts: Vec<String>) -> Result<Task, ActionError> {
    let mut uri = args([
        ("timeout", Value::from(REQUEST_TIMEOUT_SECS)),
        ("url", Value::from(config.require("restUrl")?)),
        ("validate_certs", Value::from(false)),
    ]);
    if let Some(user) = config.optional("restUser")? {
        uri.insert(Value::from("url_username"), Value::from(user));
    }
    if let Some(pass) = config.optional("restPass")? {
        uri.insert(Value::from("url_password"), Value::from(pass));
    }
    uri.insert(
        Value::from("method"),
        Value::from(config.optional_or("httpVerb", DEFAULT_METHOD)?),
    );

    Ok(Task::new("alert action: rest", "uri", uri).with_items(hosts))
}

pub fn plan(config: &Configuration) -> Result<ActionPlan, ActionError> {
    tracing::info!("Running REST task against {}", config.require("restUrl")?);

    let hosts = config.hosts()?;
    tracing::info!("Hosts involved: {:?}", hosts);

    let play = Play::new(GROUP)
        .gather_facts(false)
        .connection("local")
        .task(task(config, hosts)?);
    tracing::info!("Playbook :: {}", masked(&play).to_json());

    Ok(ActionPlan {
        request: RunRequest::new(play, Inventory::localhost(GROUP)).timeout(RUN_TIMEOUT),
        submission: Submission::Blocking,
    })
}

/// Copy of the play with the endpoint password masked, for logging
fn masked(play: &Play) -> Play {
    let mut play = play.clone();
    for task in &mut play.tasks {
        if let PlayTask::Built(task) = task {
            if let Some(Value::Mapping(uri)) = task.module.get_mut("uri") {
                if uri.contains_key("url_password") {
                    uri.insert(Value::from("url_password"), Value::from("********"));
                }
            }
        }
    }
    play
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::*;
    use crate::actions::{dispatch, Mode, ReturnCode};
    use crate::executor::scripted::ScriptedRunner;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_task_defaults() {
        let cfg = config(json!({"hosts": "web01,web02", "restUrl": "https://lb/api/drain"}));
        let task = task(&cfg, cfg.hosts().unwrap()).unwrap();
        let uri = task.args("uri").unwrap();

        assert_eq!(uri.get("timeout"), Some(&Value::from(60u64)));
        assert_eq!(uri.get("validate_certs"), Some(&Value::from(false)));
        assert_eq!(uri.get("method"), Some(&Value::from("GET")));
        assert!(!uri.contains_key("url_username"));
        assert_eq!(
            task.with_items,
            Some(vec!["web01".to_string(), "web02".to_string()])
        );
    }

    #[test]
    fn test_task_credentials_and_verb() {
        let cfg = config(json!({
            "hosts": "web01",
            "restUrl": "https://lb/api/drain",
            "restUser": "ops",
            "restPass": "s3cret",
            "httpVerb": "POST",
        }));
        let task = task(&cfg, cfg.hosts().unwrap()).unwrap();
        let uri = task.args("uri").unwrap();

        assert_eq!(uri.get("url_username"), Some(&Value::from("ops")));
        assert_eq!(uri.get("url_password"), Some(&Value::from("s3cret")));
        assert_eq!(uri.get("method"), Some(&Value::from("POST")));
    }

    #[test]
    fn test_plan_runs_locally() {
        let cfg = config(json!({"hosts": "web01", "restUrl": "https://lb/api/drain"}));
        let plan = plan(&cfg).unwrap();

        assert_eq!(plan.submission, Submission::Blocking);
        assert_eq!(plan.request.timeout, Some(Duration::from_secs(90)));
        assert_eq!(plan.request.inventory.to_ini(), "[a]\nlocalhost\n");
        assert_eq!(plan.request.play.connection.as_deref(), Some("local"));
        assert_eq!(plan.request.play.gather_facts, Some(false));
        assert!(plan.request.ssh_key.is_none());
    }

    #[test]
    fn test_masked_hides_password_only_in_copy() {
        let cfg = config(json!({"hosts": "web01", "restUrl": "https://x", "restPass": "s3cret"}));
        let plan = plan(&cfg).unwrap();

        assert!(!masked(&plan.request.play).to_json().contains("s3cret"));
        assert!(plan.request.play.to_json().contains("s3cret"));
    }

    #[tokio::test]
    async fn test_failure_event_sets_return_code() {
        let runner = ScriptedRunner::new().then(vec![ok("web01"), failed("web02"), ok("web03")]);
        let cfg = config(json!({"hosts": "web01,web02,web03", "restUrl": "https://x"}));

        let code = dispatch(Mode::Rest, &cfg, &ctx(&runner)).await;

        assert_eq!(code, ReturnCode::Failure);
        let recorded = runner.recorded();
        assert_eq!(recorded.len(), 1);
        assert!(!recorded[0].background);
    }
}
