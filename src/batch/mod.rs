//! Batch execution: discover inputs, plan one job per frame, run them on a worker pool.
//!
//! Jobs are independent. A failing frame is reported in the [`report::BatchReport`] and never
//! stops its siblings.

pub mod config;
pub mod discovery;
pub mod job;
pub mod pipeline;
pub mod plan;
pub mod report;
pub mod scheduler;
