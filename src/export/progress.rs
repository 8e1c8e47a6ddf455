//! Export progress reporting
//!
//! The driver reports each user through a [`ProgressObserver`]. Without a UI
//! attached, [`LoggingObserver`] logs each user with an ETA derived from the
//! average time spent per user so far.

use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;

/// Receives one callback per user processed.
pub trait ProgressObserver: Send + Sync {
    /// Called once before the first user, with the total count.
    fn on_start(&self, _total: usize) {}

    /// Called before user `index` (0-based) of `total` is aggregated.
    fn on_principal(&self, index: usize, total: usize, identifier: &str);

    /// Called after the last user.
    fn on_finish(&self) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_principal(&self, _index: usize, _total: usize, _identifier: &str) {}
}

/// Remaining-time estimate from the average per-item duration.
pub fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Option<Duration> {
    if done == 0 {
        return None;
    }
    let per_item = elapsed.as_secs_f64() / done as f64;
    let remaining = total.saturating_sub(done) as f64;
    Duration::try_from_secs_f64(per_item * remaining).ok()
}

/// Short human duration ("45s", "12m", "1.5h").
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{:.1}h", secs as f64 / 3600.0)
    }
}

/// Logs "Processing user i/n: email (ETA: ...)" lines.
#[derive(Debug)]
pub struct LoggingObserver {
    started: Mutex<Instant>,
}

impl LoggingObserver {
    /// Observer whose clock starts now.
    pub fn new() -> Self {
        Self {
            started: Mutex::new(Instant::now()),
        }
    }

    /// Format one progress line.
    pub fn format_line(index: usize, total: usize, identifier: &str, elapsed: Duration) -> String {
        match estimate_remaining(elapsed, index, total) {
            Some(eta) => format!(
                "Processing user {}/{}: {} (ETA: {})",
                index + 1,
                total,
                identifier,
                format_duration(eta)
            ),
            None => format!("Processing user {}/{}: {}", index + 1, total, identifier),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started
            .lock()
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for LoggingObserver {
    fn on_start(&self, total: usize) {
        if let Ok(mut started) = self.started.lock() {
            *started = Instant::now();
        }
        info!("Exporting {} users", total);
    }

    fn on_principal(&self, index: usize, total: usize, identifier: &str) {
        info!("{}", Self::format_line(index, total, identifier, self.elapsed()));
    }
}
