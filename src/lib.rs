// Alert Actions - remediation adapter for alerting systems
//
// Reads an alert payload, turns it into a playbook for the requested mode
// and hands it to ansible-runner, reporting task failures as the exit code.

pub mod actions;
pub mod app;
pub mod executor;
pub mod inventory;
pub mod output;
pub mod payload;
pub mod playbook;
pub mod secrets;

pub use actions::{dispatch, ActionContext, Mode, ReturnCode};
pub use executor::{AnsibleRunner, PlaybookRunner, RunRequest, RunnerEvent};
pub use output::ActionError;
pub use payload::{Configuration, Payload};

/// Version of the adapter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
