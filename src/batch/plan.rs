use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::batch::discovery::assign_frame_numbers;
use crate::batch::job::{Job, JobSource, frame_output_name};
use crate::batch::report::SkippedImage;
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{BorderError, BorderResult};
use crate::sequence::descriptor::SequenceDescriptor;

/// Jobs ready for dispatch plus the inputs that were left out.
#[derive(Debug, Default)]
pub struct JobPlan {
    pub jobs: Vec<Job>,
    pub skipped: Vec<SkippedImage>,
}

impl JobPlan {
    fn push(&mut self, mut job: Job) {
        job.index = self.jobs.len();
        self.jobs.push(job);
    }
}

/// Pair each image with its frame descriptor. Output keeps the image's file name.
///
/// Images without a descriptor, or whose output would collide with an earlier job's, are skipped.
pub fn plan_overlay_jobs(
    images: &[PathBuf],
    seq: &SequenceDescriptor,
    out_dir: &Path,
) -> JobPlan {
    let mut plan = JobPlan::default();
    let mut destinations = HashSet::new();

    for (frame, path) in assign_frame_numbers(images) {
        let Some(descriptor) = seq.get(frame) else {
            let reason = BorderError::MissingFrameData(frame).to_string();
            tracing::warn!(%frame, path = %path.display(), "no border data for image, skipping");
            plan.skipped.push(SkippedImage {
                frame,
                path,
                reason,
            });
            continue;
        };
        let Some(name) = path.file_name() else {
            plan.skipped.push(SkippedImage {
                frame,
                path,
                reason: "image path has no file name".to_string(),
            });
            continue;
        };
        let destination = out_dir.join(name);
        if !destinations.insert(destination.clone()) {
            tracing::warn!(%frame, path = %path.display(), "output name already taken, skipping");
            plan.skipped.push(SkippedImage {
                frame,
                path,
                reason: format!("duplicate output path '{}'", destination.display()),
            });
            continue;
        }

        plan.push(Job {
            index: 0,
            frame,
            source: JobSource::Image(path),
            descriptor: descriptor.clone(),
            destination,
        });
    }
    plan
}

/// One generated frame per descriptor, in frame order, named `frame_NNNN.png`.
pub fn plan_generate_jobs(
    seq: &SequenceDescriptor,
    out_dir: &Path,
    size: Option<Canvas>,
    background: Rgb8,
) -> JobPlan {
    let mut plan = JobPlan::default();
    for (frame, descriptor) in seq.frames() {
        plan.push(Job {
            index: 0,
            frame,
            source: JobSource::Canvas { size, background },
            descriptor: descriptor.clone(),
            destination: out_dir.join(frame_output_name(frame)),
        });
    }
    plan
}

pub fn prepare_output_dir(dir: &Path) -> BorderResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| BorderError::directory_creation(format!("'{}': {e}", dir.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/plan.rs"]
mod tests;
