// Log sink setup: rotating file plus a stderr mirror

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use super::logfile::RotatingFile;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_FILTER_ENV: &str = "ALERT_ACTIONS_LOG";

/// Environment variable naming the log file
pub const LOG_FILE_ENV: &str = "ALERT_ACTIONS_LOG_FILE";

pub const DEFAULT_LOG_FILE: &str = "/opt/splunk/var/log/splunk/ansible_actions.log";

const TIMESTAMP_FORMAT: &str = "%m-%d-%Y %H:%M:%S%.3f";

/// `MM-DD-YYYY HH:MM:SS.mmm [pid] LEVEL: message`
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionLogFormat;

impl<S, N> FormatEvent<S, N> for ActionLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} [{}] {}: ",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            std::process::id(),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Log file named by `ALERT_ACTIONS_LOG_FILE`, else the default.
///
/// Used before the command line has been parsed.
pub fn log_file_from_env() -> PathBuf {
    resolve_log_file(std::env::var_os(LOG_FILE_ENV))
}

fn resolve_log_file(value: Option<OsString>) -> PathBuf {
    match value {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_LOG_FILE),
    }
}

fn stderr_layer<S>() -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .event_format(ActionLogFormat)
        .with_writer(std::io::stderr)
}

/// Install the global subscriber.
///
/// Without a usable log file, logging still reaches stderr and a warning
/// records why the file is missing.
pub fn init(log_file: &Path) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    match RotatingFile::open(log_file) {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .event_format(ActionLogFormat)
                .with_writer(move || file.clone());

            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(stderr_layer())
                .try_init()?;
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer())
                .try_init()?;

            tracing::warn!(
                "Cannot open log file {}: {}; logging to stderr only",
                log_file.display(),
                e
            );
        }
    }
    Ok(())
}
