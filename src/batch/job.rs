use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use image::{ImageFormat, RgbImage};

use crate::composite::border::{Composited, blank_canvas, composite_frame};
use crate::foundation::core::{Canvas, FrameIndex, Rgb8};
use crate::foundation::error::{BorderError, BorderResult};
use crate::sequence::descriptor::FrameDescriptor;

/// Where a job's starting raster comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobSource {
    /// Decode an existing image file.
    Image(PathBuf),
    /// Start from a solid raster. `size: None` takes the size implied by edge arrays.
    Canvas {
        size: Option<Canvas>,
        background: Rgb8,
    },
}

/// One unit of work: one source raster + one descriptor -> one output file.
#[derive(Clone, Debug)]
pub struct Job {
    /// Submission position; reassigned by the scheduler at dispatch.
    pub index: usize,
    pub frame: FrameIndex,
    pub source: JobSource,
    pub descriptor: Arc<FrameDescriptor>,
    pub destination: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Succeeded,
    Failed,
    /// Never started because the batch was cancelled.
    Cancelled,
}

/// Outcome of one dispatched job. Created once, never mutated.
#[derive(Clone, Debug, serde::Serialize)]
pub struct JobResult {
    pub index: usize,
    pub frame: FrameIndex,
    pub pixels_applied: usize,
    pub status: JobStatus,
    /// Output path on success, error text otherwise.
    pub message: String,
    pub elapsed: Duration,
}

impl JobResult {
    pub fn succeeded(job: &Job, pixels_applied: usize, elapsed: Duration) -> Self {
        Self {
            index: job.index,
            frame: job.frame,
            pixels_applied,
            status: JobStatus::Succeeded,
            message: job.destination.display().to_string(),
            elapsed,
        }
    }

    pub fn failed(
        index: usize,
        frame: FrameIndex,
        message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            index,
            frame,
            pixels_applied: 0,
            status: JobStatus::Failed,
            message: message.into(),
            elapsed,
        }
    }

    pub fn cancelled(index: usize, frame: FrameIndex) -> Self {
        Self {
            index,
            frame,
            pixels_applied: 0,
            status: JobStatus::Cancelled,
            message: "cancelled before start".to_string(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn success(&self) -> bool {
        self.status == JobStatus::Succeeded
    }

    /// Timing-independent view, for comparing runs.
    pub fn outcome(&self) -> (FrameIndex, JobStatus, usize) {
        (self.frame, self.status, self.pixels_applied)
    }
}

const GATE_QUEUED: u8 = 0;
const GATE_RUNNING: u8 = 1;
const GATE_COMMITTING: u8 = 2;
const GATE_ABANDONED: u8 = 3;

/// Lifecycle of one dispatched job, shared by its worker and the collector.
///
/// Every move is a compare-and-swap, so a job the collector abandons can never publish
/// its output, and a job that has started publishing can no longer be abandoned.
#[derive(Debug, Default)]
pub struct JobGate(AtomicU8);

impl JobGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn advance(&self, from: u8, to: u8) -> bool {
        self.0
            .compare_exchange(from, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Queued -> running. False when the job was abandoned before a worker picked it up.
    pub fn start(&self) -> bool {
        self.advance(GATE_QUEUED, GATE_RUNNING)
    }

    /// Running -> committing, taken right before the output file is moved into place.
    pub fn commit(&self) -> bool {
        self.advance(GATE_RUNNING, GATE_COMMITTING)
    }

    pub fn abandon_queued(&self) -> bool {
        self.advance(GATE_QUEUED, GATE_ABANDONED)
    }

    /// False when the job already committed; it is about to report and must not be failed.
    pub fn abandon_running(&self) -> bool {
        self.advance(GATE_RUNNING, GATE_ABANDONED)
    }

    pub fn is_abandoned(&self) -> bool {
        self.0.load(Ordering::SeqCst) == GATE_ABANDONED
    }
}

/// Run one job to completion on the calling thread. Errors and panics become a failed result.
pub fn execute_job(job: &Job) -> JobResult {
    let gate = JobGate::new();
    gate.start();
    execute_gated(job, &gate)
}

/// Like [`execute_job`], but the output is only published while `gate` still allows it.
#[tracing::instrument(skip(job, gate), fields(frame = %job.frame, index = job.index))]
pub fn execute_gated(job: &Job, gate: &JobGate) -> JobResult {
    let started = Instant::now();
    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| run_job(job, gate)));
    let elapsed = started.elapsed();

    match outcome {
        Ok(Ok(applied)) => {
            tracing::debug!(applied, kind = job.descriptor.kind(), ?elapsed, "frame written");
            JobResult::succeeded(job, applied, elapsed)
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "frame failed");
            JobResult::failed(job.index, job.frame, e.to_string(), elapsed)
        }
        Err(payload) => {
            let msg = format!("worker panicked: {}", panic_message(payload.as_ref()));
            tracing::error!(%msg, "frame failed");
            JobResult::failed(job.index, job.frame, msg, elapsed)
        }
    }
}

fn run_job(job: &Job, gate: &JobGate) -> BorderResult<usize> {
    let image = load_source(job)?;
    let Composited {
        image,
        pixels_applied,
    } = composite_frame(image, &job.descriptor)?;
    save_image(&image, &job.destination, gate)?;
    Ok(pixels_applied)
}

fn load_source(job: &Job) -> BorderResult<RgbImage> {
    match &job.source {
        JobSource::Image(path) => image::open(path)
            .map(|img| img.to_rgb8())
            .map_err(|e| BorderError::image_decode(format!("'{}': {e}", path.display()))),
        JobSource::Canvas { size, background } => {
            let canvas = match (size, job.descriptor.as_ref()) {
                (Some(size), _) => *size,
                (None, FrameDescriptor::Edges(edges)) => edges.canvas()?,
                (None, FrameDescriptor::Pixels(_)) => {
                    return Err(BorderError::validation(
                        "pixel frames need an explicit canvas size to generate from",
                    ));
                }
            };
            Ok(blank_canvas(canvas, *background))
        }
    }
}

/// Encode by the destination's extension into a hidden sibling, then rename it into place
/// once the gate commits.
fn save_image(image: &RgbImage, dest: &Path, gate: &JobGate) -> BorderResult<()> {
    let encode_err = |e: &dyn std::fmt::Display| {
        BorderError::image_encode(format!("'{}': {e}", dest.display()))
    };
    let format = ImageFormat::from_path(dest).map_err(|e| encode_err(&e))?;
    let partial = PartialFile(partial_path(dest));
    image
        .save_with_format(&partial.0, format)
        .map_err(|e| encode_err(&e))?;

    if !gate.commit() {
        return Err(BorderError::Other(anyhow::anyhow!(
            "abandoned after timeout; '{}' not written",
            dest.display()
        )));
    }
    std::fs::rename(&partial.0, dest).map_err(|e| encode_err(&e))?;
    Ok(())
}

fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.partial"))
}

/// Removes the encoder's scratch file unless it was renamed away.
struct PartialFile(PathBuf);

impl Drop for PartialFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// `frame_0007.png`
pub fn frame_output_name(frame: FrameIndex) -> String {
    format!("frame_{:04}.png", frame.0)
}

#[cfg(test)]
#[path = "../../tests/unit/batch/job.rs"]
mod tests;
