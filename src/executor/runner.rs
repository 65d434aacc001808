// ansible-runner process driver

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use super::{PlaybookRunner, RunHandle, RunRequest, RunStatus, RunnerEvent};
use crate::output::errors::ActionError;

/// Playbook file name inside the private data directory's `project/`
pub const PLAYBOOK_FILE: &str = "main.yml";

/// Runs plays through the `ansible-runner` command line.
///
/// Each run gets its own private data directory:
///
/// ```text
/// <tmp>/project/main.yml     the play
/// <tmp>/inventory/hosts      INI inventory
/// <tmp>/env/ssh_key          private key (0600), when one is given
/// <tmp>/env/settings         job_timeout, when one is given
/// ```
///
/// The engine is started in JSON mode and every stdout line is one event.
pub struct AnsibleRunner {
    program: PathBuf,
    keep_artifacts: bool,
}

impl AnsibleRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        AnsibleRunner {
            program: program.into(),
            keep_artifacts: false,
        }
    }

    /// Leave the private data directory behind after the run
    pub fn keep_artifacts(mut self, keep: bool) -> Self {
        self.keep_artifacts = keep;
        self
    }

    /// Write the private data directory for `request`
    pub fn stage(&self, request: &RunRequest) -> Result<TempDir, ActionError> {
        let dir = tempfile::Builder::new()
            .prefix("alert-actions-")
            .disable_cleanup(self.keep_artifacts)
            .tempdir()
            .map_err(|e| ActionError::Io {
                message: format!("Failed to create private data directory: {}", e),
                path: None,
            })?;
        let root = dir.path();

        let playbook = request.play.to_yaml().map_err(|e| ActionError::Runner {
            message: format!("Failed to render playbook: {}", e),
            suggestion: None,
        })?;
        write_file(&root.join("project").join(PLAYBOOK_FILE), &playbook)?;
        write_file(
            &root.join("inventory").join("hosts"),
            &request.inventory.to_ini(),
        )?;

        if let Some(key) = &request.ssh_key {
            let path = root.join("env").join("ssh_key");
            write_file(&path, key)?;
            restrict_permissions(&path)?;
        }

        if let Some(timeout) = request.timeout {
            write_file(
                &root.join("env").join("settings"),
                &format!("job_timeout: {}\n", timeout.as_secs()),
            )?;
        }

        if self.keep_artifacts {
            tracing::info!("Run artifacts kept in {}", root.display());
        }

        Ok(dir)
    }
}

#[async_trait]
impl PlaybookRunner for AnsibleRunner {
    async fn run_async(&self, request: RunRequest) -> Result<RunHandle, ActionError> {
        let dir = self.stage(&request)?;

        let mut child = Command::new(&self.program)
            .arg("run")
            .arg(dir.path())
            .arg("--playbook")
            .arg(PLAYBOOK_FILE)
            .arg("--json")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(if request.quiet {
                Stdio::null()
            } else {
                Stdio::inherit()
            })
            .spawn()
            .map_err(|e| ActionError::Runner {
                message: format!("Failed to start {}: {}", self.program.display(), e),
                suggestion: Some(
                    "Install ansible-runner or pass --runner with the path to it".to_string(),
                ),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| ActionError::Runner {
            message: "Failed to capture runner stdout".to_string(),
            suggestion: None,
        })?;

        let (tx, rx) = mpsc::unbounded_channel();

        let completion = tokio::spawn(async move {
            // Removed when this task ends, unless artifacts are kept
            let _private_data = dir;

            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(event) = parse_event_line(&line) {
                            let _ = tx.send(event);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("Stopped reading runner output: {}", e);
                        break;
                    }
                }
            }
            drop(tx);

            let status = child.wait().await.map_err(|e| ActionError::Runner {
                message: format!("Failed to wait for runner: {}", e),
                suggestion: None,
            })?;

            Ok::<_, ActionError>(RunStatus::from_exit_code(status.code()))
        });

        Ok(RunHandle::new(rx, completion))
    }
}

/// One stdout line in JSON mode; anything that is not an event is skipped
pub fn parse_event_line(line: &str) -> Option<RunnerEvent> {
    let line = line.trim();
    if !line.starts_with('{') {
        if !line.is_empty() {
            tracing::debug!("runner: {}", line);
        }
        return None;
    }

    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!("Skipping unparseable runner line ({}): {}", e, line);
            None
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ActionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ActionError::io(format!("Failed to create directory: {}", e), parent))?;
    }
    fs::write(path, content).map_err(|e| ActionError::io(format!("Failed to write file: {}", e), path))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ActionError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| ActionError::io(format!("Failed to set file permissions: {}", e), path))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ActionError> {
    Ok(())
}
