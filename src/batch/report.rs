use std::path::PathBuf;
use std::time::Duration;

use crate::batch::job::{JobResult, JobStatus};
use crate::foundation::core::FrameIndex;
use crate::sequence::descriptor::InvalidFrame;

/// An input image that never became a job.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SkippedImage {
    pub frame: FrameIndex,
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FrameFailure {
    pub frame: FrameIndex,
    pub message: String,
}

/// Aggregate outcome of one batch run.
#[derive(Clone, Debug, serde::Serialize)]
pub struct BatchReport {
    pub frames_total: usize,
    pub frames_succeeded: usize,
    pub frames_failed: usize,
    pub frames_cancelled: usize,
    pub frames_skipped: usize,
    pub pixels_applied: u64,
    pub workers: usize,
    pub elapsed_secs: f64,
    /// Sorted by frame number, then submission order.
    pub results: Vec<JobResult>,
    /// Failed jobs, sorted by frame number.
    pub failures: Vec<FrameFailure>,
    /// Frames dropped while reading the sequence document.
    pub invalid_frames: Vec<InvalidFrame>,
    pub skipped: Vec<SkippedImage>,
}

impl BatchReport {
    pub fn from_results(mut results: Vec<JobResult>, workers: usize, elapsed: Duration) -> Self {
        results.sort_by_key(|r| (r.frame, r.index));

        let count = |status: JobStatus| results.iter().filter(|r| r.status == status).count();
        let frames_succeeded = count(JobStatus::Succeeded);
        let frames_failed = count(JobStatus::Failed);
        let frames_cancelled = count(JobStatus::Cancelled);
        let pixels_applied = results
            .iter()
            .filter(|r| r.success())
            .map(|r| r.pixels_applied as u64)
            .sum();
        let failures = results
            .iter()
            .filter(|r| r.status == JobStatus::Failed)
            .map(|r| FrameFailure {
                frame: r.frame,
                message: r.message.clone(),
            })
            .collect();

        Self {
            frames_total: results.len(),
            frames_succeeded,
            frames_failed,
            frames_cancelled,
            frames_skipped: 0,
            pixels_applied,
            workers,
            elapsed_secs: elapsed.as_secs_f64(),
            results,
            failures,
            invalid_frames: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn with_invalid_frames(mut self, invalid: Vec<InvalidFrame>) -> Self {
        self.invalid_frames = invalid;
        self
    }

    pub fn with_skipped(mut self, skipped: Vec<SkippedImage>) -> Self {
        self.frames_skipped = skipped.len();
        self.skipped = skipped;
        self
    }

    pub fn has_success(&self) -> bool {
        self.frames_succeeded > 0
    }

    /// Jobs that ran to an outcome (succeeded or failed) per second of wall-clock time.
    pub fn frames_per_sec(&self) -> f64 {
        let processed = (self.frames_succeeded + self.frames_failed) as f64;
        if self.elapsed_secs > 0.0 {
            processed / self.elapsed_secs
        } else {
            0.0
        }
    }

    pub fn avg_secs_per_frame(&self) -> f64 {
        let processed = self.frames_succeeded + self.frames_failed;
        if processed == 0 {
            0.0
        } else {
            self.elapsed_secs / processed as f64
        }
    }

    /// `Frame 12: image decode error: ...`, one line per failed job.
    pub fn failure_lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| format!("Frame {}: {}", f.frame, f.message))
            .collect()
    }

    /// Multi-line human summary.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Processed {} frames in {:.2}s (avg {:.3}s/frame, {:.2} frames/sec)\n\
             succeeded: {}, failed: {}, cancelled: {}, skipped: {}, invalid in document: {}\n\
             border pixels applied: {}",
            self.frames_total,
            self.elapsed_secs,
            self.avg_secs_per_frame(),
            self.frames_per_sec(),
            self.frames_succeeded,
            self.frames_failed,
            self.frames_cancelled,
            self.frames_skipped,
            self.invalid_frames.len(),
            self.pixels_applied,
        );
        if !self.failures.is_empty() {
            out.push_str("\nFailed frames:");
            for line in self.failure_lines() {
                out.push_str("\n  ");
                out.push_str(&line);
            }
        }
        if !self.invalid_frames.is_empty() {
            out.push_str("\nInvalid frames:");
            for invalid in &self.invalid_frames {
                out.push_str(&format!("\n  Frame {}: {}", invalid.number, invalid.reason));
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/report.rs"]
mod tests;
