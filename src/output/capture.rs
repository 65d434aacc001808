// In-memory log capture for tests

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::dispatcher::DefaultGuard;
use tracing::Level;

#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Captured lines logged at exactly `level`
    pub fn lines_at(&self, level: Level) -> Vec<String> {
        let tag = format!(" {} ", level);
        self.contents()
            .lines()
            .filter(|line| line.contains(&tag))
            .map(String::from)
            .collect()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Capture everything up to `max` on this thread until the guard drops.
///
/// Works across `.await` in `#[tokio::test]`, which runs on one thread.
pub fn capture(max: Level) -> (Capture, DefaultGuard) {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
