//! borderseq draws per-frame borders onto image sequences in parallel.
//!
//! A border document (XML) describes, for each frame number, either an explicit list of border
//! pixels or four full-length edge color arrays. The crate can:
//!
//! - Overlay those borders onto an existing, numbered image sequence ([`run_overlay`])
//! - Generate a fresh sequence of bordered canvases ([`run_generate`])
//! - Write sample documents to drive either mode ([`write_sequence_xml`])
//!
//! Each frame is an independent job on a bounded worker pool. One bad frame is reported, never
//! fatal to the batch.
#![forbid(unsafe_code)]

pub mod batch;
pub mod color;
pub mod composite;
pub mod foundation;
pub mod progress;
pub mod sequence;

pub use crate::foundation::core::{Canvas, FrameIndex, Rgb8};
pub use crate::foundation::error::{BorderError, BorderResult};

pub use crate::batch::config::BatchOpts;
pub use crate::batch::job::{Job, JobResult, JobSource, JobStatus};
pub use crate::batch::pipeline::{GenerateRequest, OverlayRequest, run_generate, run_overlay};
pub use crate::batch::report::BatchReport;
pub use crate::batch::scheduler::{BatchScheduler, CancelToken};
pub use crate::composite::border::{apply_border, composite_frame};
pub use crate::progress::reporter::{
    ConsoleProgress, NullProgress, ProgressEvent, ProgressObserver, RecordingProgress,
};
pub use crate::sequence::descriptor::{DescriptorFormat, FrameDescriptor, SequenceDescriptor};
pub use crate::sequence::document::write_sequence_xml;
