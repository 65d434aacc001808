// SSH key retrieval from the parameter store, through a one-task local run

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;
use zeroize::Zeroizing;

use crate::executor::{PlaybookRunner, RunRequest};
use crate::inventory::Inventory;
use crate::playbook::{args, Play, Task};

/// Fact the lookup task stores the secret under
pub const SECRET_FACT: &str = "sshKey";

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-west-2";

const LOOKUP_GROUP: &str = "single";

static PARAMETER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-/]+$").expect("valid parameter name regex"));

/// Template expression resolving `name` in the parameter store, decrypted
pub fn lookup_expression(name: &str, region: &str) -> String {
    format!(
        "{{{{ lookup('aws_ssm', '{}', decrypt=true, region='{}') }}}}",
        name, region
    )
}

/// The single-task play that pulls the key into a fact on the controller
pub fn lookup_play(name: &str, region: &str) -> Play {
    Play::new(LOOKUP_GROUP)
        .gather_facts(false)
        .connection("local")
        .task(Task::new(
            "fetch ssh key from parameter store",
            "set_fact",
            args([(SECRET_FACT, Value::from(lookup_expression(name, region)))]),
        ))
}

/// Fetch the private key stored under `name`.
///
/// The value comes back with a trailing newline so it can be written out as
/// a key file. Every `runner_on_ok` event replaces the previous result, so the
/// last one decides; an event without the fact clears it. Any failure yields
/// `None` and is only logged.
pub async fn fetch_ssh_key(
    runner: &dyn PlaybookRunner,
    name: &str,
    region: &str,
) -> Option<Zeroizing<String>> {
    tracing::info!("Looking for SSM SSH Key: {}", name);

    if !PARAMETER_NAME.is_match(name) {
        tracing::error!("Refusing SSM parameter name with unexpected characters: {:?}", name);
        return None;
    }

    let play = lookup_play(name, region);
    tracing::debug!("SSH Playbook :: {}", play.to_json());

    let request = RunRequest::new(play, Inventory::localhost(LOOKUP_GROUP));
    let response = match runner.run(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("SSH key lookup did not run: {}", e);
            return None;
        }
    };

    let mut key = None;
    for event in &response.events {
        tracing::debug!("{}", event.to_json());
        if event.is_ok() {
            key = event
                .facts()
                .and_then(|facts| facts.get(SECRET_FACT))
                .and_then(|value| value.as_str())
                .map(|secret| Zeroizing::new(format!("{}\n", secret)));
        }
    }

    if key.is_none() {
        tracing::warn!("SSM SSH Key {} was not found ({})", name, response.status);
    }
    key
}
