use std::path::PathBuf;

use crate::batch::config::BatchOpts;
use crate::batch::discovery::discover_images;
use crate::batch::plan::{plan_generate_jobs, plan_overlay_jobs, prepare_output_dir};
use crate::batch::report::BatchReport;
use crate::batch::scheduler::{BatchScheduler, CancelToken};
use crate::foundation::core::Canvas;
use crate::foundation::error::BorderResult;
use crate::progress::reporter::ProgressObserver;
use crate::sequence::descriptor::SequenceDescriptor;

/// Draw borders over an existing image sequence.
#[derive(Clone, Debug)]
pub struct OverlayRequest {
    pub doc: PathBuf,
    /// Glob pattern, e.g. `frames/*.png`.
    pub input_pattern: String,
    pub out_dir: PathBuf,
    /// Cancelling it from another thread stops frames that have not started yet.
    pub cancel: CancelToken,
}

/// Render borders onto blank canvases, one image per document frame.
#[derive(Clone, Debug)]
pub struct GenerateRequest {
    pub doc: PathBuf,
    pub out_dir: PathBuf,
    /// `None` derives each frame's size from its edge arrays.
    pub size: Option<Canvas>,
    pub cancel: CancelToken,
}

/// Parse, discover, plan, create the output directory, then run.
///
/// Parse and directory errors are fatal; everything after dispatch is reported per frame.
#[tracing::instrument(skip_all, fields(doc = %req.doc.display(), input = %req.input_pattern))]
pub fn run_overlay(
    req: &OverlayRequest,
    opts: &BatchOpts,
    observer: &mut dyn ProgressObserver,
) -> BorderResult<BatchReport> {
    opts.validate()?;
    let seq = SequenceDescriptor::from_path(&req.doc, opts.format)?;
    tracing::info!(
        frames = seq.len(),
        invalid = seq.invalid().len(),
        "loaded border sequence"
    );

    let images = discover_images(&req.input_pattern)?;
    if images.is_empty() {
        tracing::warn!(pattern = %req.input_pattern, "no input images matched");
    }
    let plan = plan_overlay_jobs(&images, &seq, &req.out_dir);
    prepare_output_dir(&req.out_dir)?;

    let report =
        BatchScheduler::with_cancel(opts.clone(), req.cancel.clone()).run(plan.jobs, observer)?;
    Ok(report
        .with_invalid_frames(seq.invalid().to_vec())
        .with_skipped(plan.skipped))
}

#[tracing::instrument(skip_all, fields(doc = %req.doc.display()))]
pub fn run_generate(
    req: &GenerateRequest,
    opts: &BatchOpts,
    observer: &mut dyn ProgressObserver,
) -> BorderResult<BatchReport> {
    opts.validate()?;
    let seq = SequenceDescriptor::from_path(&req.doc, opts.format)?;
    tracing::info!(
        frames = seq.len(),
        invalid = seq.invalid().len(),
        "loaded border sequence"
    );

    let plan = plan_generate_jobs(&seq, &req.out_dir, req.size, opts.background);
    prepare_output_dir(&req.out_dir)?;

    let report =
        BatchScheduler::with_cancel(opts.clone(), req.cancel.clone()).run(plan.jobs, observer)?;
    Ok(report
        .with_invalid_frames(seq.invalid().to_vec())
        .with_skipped(plan.skipped))
}
