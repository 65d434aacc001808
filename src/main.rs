// Alert Actions CLI - invoked by the alerting system with the payload on stdin

use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::Parser;

use alert_actions::app::{self, Invocation};
use alert_actions::output::logging::{self, DEFAULT_LOG_FILE};
use alert_actions::secrets::DEFAULT_REGION;
use alert_actions::{AnsibleRunner, Mode, ReturnCode};

#[derive(Parser, Debug)]
#[command(
    name = "alert-actions",
    about = "Run remediation playbooks for alert actions",
    version,
    disable_colored_help = true
)]
struct Cli {
    /// Set by the alerting system on every invocation
    #[arg(long)]
    execute: bool,

    /// Mode to operate in
    #[arg(long, value_parser = Mode::NAMES)]
    mode: String,

    /// Log file (rotated at 16 MiB, 5 backups)
    #[arg(long, env = logging::LOG_FILE_ENV, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// ansible-runner executable
    #[arg(long, env = "ALERT_ACTIONS_RUNNER", default_value = "ansible-runner")]
    runner: PathBuf,

    /// Region of the parameter store holding SSH keys
    #[arg(long, env = "ALERT_ACTIONS_SSM_REGION", default_value = DEFAULT_REGION)]
    ssm_region: String,

    /// Keep each run's private data directory
    #[arg(long)]
    keep_artifacts: bool,
}

#[tokio::main]
async fn main() {
    let code = run().await;
    std::process::exit(code.code());
}

async fn run() -> ReturnCode {
    let args: Vec<String> = std::env::args().collect();

    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => {
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = e.print();
                return ReturnCode::Success;
            }
            init_logging(&logging::log_file_from_env());
            tracing::error!("Unsupported invocation :: {:?} :: {}", args, e.to_string().trim());
            return ReturnCode::Failure;
        }
    };

    init_logging(&cli.log_file);

    let runner = AnsibleRunner::new(&cli.runner).keep_artifacts(cli.keep_artifacts);
    let invocation = Invocation {
        execute: cli.execute,
        mode: cli.mode,
        ssm_region: cli.ssm_region,
        args,
    };
    app::run(&invocation, tokio::io::stdin(), &runner).await
}

fn init_logging(log_file: &Path) {
    if let Err(e) = logging::init(log_file) {
        eprintln!("Failed to initialise logging: {:#}", e);
    }
}
