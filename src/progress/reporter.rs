use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::job::JobStatus;
use crate::foundation::core::FrameIndex;

/// Emitted by the scheduler's collector after every job result.
#[derive(Clone, Copy, Debug)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub started_at: Instant,
    pub frame: FrameIndex,
    pub status: JobStatus,
}

/// Derived timing for one [`ProgressEvent`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
    /// `None` until the first job completes.
    pub eta: Option<Duration>,
    /// Completed jobs per second of wall-clock time.
    pub throughput: f64,
}

impl ProgressSnapshot {
    pub fn at(event: &ProgressEvent, now: Instant) -> Self {
        let elapsed = now.saturating_duration_since(event.started_at);
        let remaining = event.total.saturating_sub(event.completed);
        let eta = (event.completed > 0)
            .then(|| elapsed.mul_f64(remaining as f64 / event.completed as f64));
        let secs = elapsed.as_secs_f64();
        let throughput = if secs > 0.0 {
            event.completed as f64 / secs
        } else {
            0.0
        };
        Self {
            completed: event.completed,
            total: event.total,
            elapsed,
            eta,
            throughput,
        }
    }

    /// `elapsed 3s | eta 12s | 4.2 fps`, with `eta calculating...` before the first completion.
    pub fn message(&self) -> String {
        let eta = match self.eta {
            Some(eta) => format!("{}s", eta.as_secs()),
            None => "calculating...".to_string(),
        };
        format!(
            "elapsed {}s | eta {eta} | {:.1} fps",
            self.elapsed.as_secs(),
            self.throughput
        )
    }
}

/// Read-only observer of batch progress. It cannot influence scheduling or results.
pub trait ProgressObserver {
    /// Called once per job result, in completion order.
    fn on_progress(&mut self, event: &ProgressEvent);
    /// Called once after the last result.
    fn finish(&mut self) {}
}

/// Reporting disabled.
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn on_progress(&mut self, _event: &ProgressEvent) {}
}

/// Captures every event; for tests and embedding callers.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Vec<(ProgressEvent, ProgressSnapshot)>,
    finished: bool,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[(ProgressEvent, ProgressSnapshot)] {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl ProgressObserver for RecordingProgress {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self.events
            .push((*event, ProgressSnapshot::at(event, Instant::now())));
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

/// Terminal progress bar on stderr.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        // The template is a constant; fall back to the default style if it is ever rejected.
        let style = ProgressStyle::with_template(
            "Progress: [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | {msg}",
        )
        .map(|s| s.progress_chars("█░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message("eta calculating...");
        Self { bar }
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&mut self, event: &ProgressEvent) {
        let snap = ProgressSnapshot::at(event, Instant::now());
        self.bar.set_length(event.total as u64);
        self.bar.set_position(event.completed as u64);
        self.bar.set_message(snap.message());
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/progress/reporter.rs"]
mod tests;
