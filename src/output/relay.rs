// Audit relay for engine events

use tracing::Level;

use crate::executor::RunnerEvent;

/// Log an event at `level` with its gathered-facts block stripped.
///
/// The caller's event is not touched; the strip happens on a copy.
pub fn log_event(event: &RunnerEvent, level: Level) {
    let line = event.without_facts().to_json();
    log_at(level, &line);
}

/// Emit a message at a level chosen at runtime
pub fn log_at(level: Level, message: &str) {
    match level {
        Level::ERROR => tracing::error!("{}", message),
        Level::WARN => tracing::warn!("{}", message),
        Level::INFO => tracing::info!("{}", message),
        Level::DEBUG => tracing::debug!("{}", message),
        Level::TRACE => tracing::trace!("{}", message),
    }
}
