use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::batch::config::BatchOpts;
use crate::batch::job::{Job, JobGate, JobResult, execute_gated};
use crate::batch::report::BatchReport;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{BorderError, BorderResult};
use crate::progress::reporter::{ProgressEvent, ProgressObserver};

/// Upper bound on how long the collector sleeps between timeout checks.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shared cancellation flag. Jobs that have not started when it is set report `Cancelled`.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum WorkerMsg {
    Started { index: usize, at: Instant },
    Finished(JobResult),
}

/// Fans jobs out to a bounded worker pool and collects exactly one result per job.
#[derive(Debug)]
pub struct BatchScheduler {
    opts: BatchOpts,
    cancel: CancelToken,
}

impl BatchScheduler {
    pub fn new(opts: BatchOpts) -> Self {
        Self::with_cancel(opts, CancelToken::new())
    }

    /// Share a token the caller keeps, so it can cancel from another thread mid-run.
    pub fn with_cancel(opts: BatchOpts, cancel: CancelToken) -> Self {
        Self { opts, cancel }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run every job. One job's failure never aborts its siblings; the observer sees each
    /// result once, in completion order, then `finish`.
    #[tracing::instrument(skip_all, fields(jobs = jobs.len()))]
    pub fn run(
        &self,
        jobs: Vec<Job>,
        observer: &mut dyn ProgressObserver,
    ) -> BorderResult<BatchReport> {
        let started_at = Instant::now();
        let total = jobs.len();
        if total == 0 {
            observer.finish();
            return Ok(BatchReport::from_results(Vec::new(), 0, started_at.elapsed()));
        }

        let workers = self.opts.resolve_workers(total)?;
        let pool = build_thread_pool(workers)?;
        tracing::info!(jobs = total, workers, "dispatching frame jobs");

        let frames: Vec<FrameIndex> = jobs.iter().map(|j| j.frame).collect();
        let gates: Vec<Arc<JobGate>> = (0..total).map(|_| Arc::new(JobGate::new())).collect();
        let (tx, rx) = mpsc::channel::<WorkerMsg>();
        for (index, mut job) in jobs.into_iter().enumerate() {
            job.index = index;
            let tx = tx.clone();
            let cancel = self.cancel.clone();
            let gate = Arc::clone(&gates[index]);
            pool.spawn_fifo(move || {
                // Send failures mean the collector has given up on this job; nothing to report to.
                if cancel.is_cancelled() {
                    let _ = tx.send(WorkerMsg::Finished(JobResult::cancelled(index, job.frame)));
                    return;
                }
                if !gate.start() {
                    tracing::debug!(frame = %job.frame, "skipping job abandoned while queued");
                    return;
                }
                let _ = tx.send(WorkerMsg::Started {
                    index,
                    at: Instant::now(),
                });
                let _ = tx.send(WorkerMsg::Finished(execute_gated(&job, &gate)));
            });
        }
        drop(tx);

        let mut collector = Collector {
            frames,
            gates,
            results: vec![None; total],
            in_flight: HashMap::new(),
            timed_out: HashSet::new(),
            completed: 0,
            started_at,
            observer,
        };
        collector.drain(&rx, self.opts.job_timeout(), workers);
        collector.observer.finish();

        let results: Vec<JobResult> = collector.results.into_iter().flatten().collect();
        let report = BatchReport::from_results(results, workers, started_at.elapsed());
        tracing::info!(
            succeeded = report.frames_succeeded,
            failed = report.frames_failed,
            cancelled = report.frames_cancelled,
            elapsed_secs = report.elapsed_secs,
            "batch finished"
        );
        Ok(report)
    }
}

struct Collector<'o> {
    frames: Vec<FrameIndex>,
    /// Shared with each job's closure. Abandoning through the gate keeps a job from running
    /// or publishing output after its result has been settled here.
    gates: Vec<Arc<JobGate>>,
    results: Vec<Option<JobResult>>,
    in_flight: HashMap<usize, Instant>,
    /// Jobs already reported as timed out whose worker has not returned yet.
    timed_out: HashSet<usize>,
    completed: usize,
    started_at: Instant,
    observer: &'o mut dyn ProgressObserver,
}

impl Collector<'_> {
    fn drain(
        &mut self,
        rx: &mpsc::Receiver<WorkerMsg>,
        timeout: Option<Duration>,
        workers: usize,
    ) {
        let total = self.results.len();
        let poll = timeout.map(|t| t.min(POLL_INTERVAL));

        while self.completed < total {
            let msg = match poll {
                Some(poll) => match rx.recv_timeout(poll) {
                    Ok(msg) => Some(msg),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match rx.recv() {
                    Ok(msg) => Some(msg),
                    Err(_) => break,
                },
            };

            match msg {
                Some(WorkerMsg::Started { index, at }) => {
                    self.in_flight.insert(index, at);
                }
                Some(WorkerMsg::Finished(result)) => {
                    self.in_flight.remove(&result.index);
                    if self.timed_out.remove(&result.index) {
                        tracing::warn!(
                            frame = %result.frame,
                            "discarding result that arrived after its timeout"
                        );
                    }
                    self.record(result);
                }
                None => {}
            }

            if let Some(limit) = timeout {
                self.expire(limit, Instant::now());
                if self.timed_out.len() >= workers {
                    self.fail_unstarted("not started: every worker is stuck on a timed-out job");
                }
            }
        }

        // Nothing else reports past this point.
        self.in_flight.clear();
        self.fail_missing("worker exited without reporting a result");
    }

    /// The first result for an index wins; later ones are ignored.
    fn record(&mut self, result: JobResult) {
        let index = result.index;
        if self.results[index].is_some() {
            return;
        }
        let event = ProgressEvent {
            completed: self.completed + 1,
            total: self.results.len(),
            started_at: self.started_at,
            frame: result.frame,
            status: result.status,
        };
        self.results[index] = Some(result);
        self.completed += 1;
        self.observer.on_progress(&event);
    }

    fn expire(&mut self, limit: Duration, now: Instant) {
        let mut expired: Vec<usize> = self
            .in_flight
            .iter()
            .filter(|(_, at)| now.saturating_duration_since(**at) >= limit)
            .map(|(index, _)| *index)
            .collect();
        expired.sort_unstable();

        for index in expired {
            if !self.gates[index].abandon_running() {
                // Already committing its output; the result is on its way.
                continue;
            }
            self.in_flight.remove(&index);
            self.timed_out.insert(index);
            let frame = self.frames[index];
            tracing::warn!(%frame, limit_secs = limit.as_secs(), "frame job timed out");
            self.record(JobResult::failed(
                index,
                frame,
                format!("timed out after {}s", limit.as_secs()),
                limit,
            ));
        }
    }

    /// Fail queued jobs, abandoning them so a worker that frees up later skips them.
    fn fail_unstarted(&mut self, message: &str) {
        let queued: Vec<usize> = (0..self.results.len())
            .filter(|i| self.results[*i].is_none() && !self.in_flight.contains_key(i))
            .filter(|i| self.gates[*i].abandon_queued())
            .collect();
        self.fail_all(queued, message);
    }

    /// Fail every job without a result. Only valid once no worker can report anymore.
    fn fail_missing(&mut self, message: &str) {
        let missing: Vec<usize> = (0..self.results.len())
            .filter(|i| self.results[*i].is_none())
            .collect();
        self.fail_all(missing, message);
    }

    fn fail_all(&mut self, indices: Vec<usize>, message: &str) {
        for index in indices {
            let frame = self.frames[index];
            tracing::warn!(%frame, message, "frame job has no result");
            self.record(JobResult::failed(index, frame, message, Duration::ZERO));
        }
    }
}

pub(crate) fn build_thread_pool(threads: usize) -> BorderResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(BorderError::validation("worker count must be >= 1"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("borderseq-worker-{i}"))
        .build()
        .map_err(|e| BorderError::Other(anyhow::anyhow!("failed to build worker pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/scheduler.rs"]
mod tests;
