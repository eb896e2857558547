use std::path::Path;
use std::time::Duration;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{BorderError, BorderResult};
use crate::sequence::descriptor::DescriptorFormat;

/// Default per-job timeout. Generous; only meant to catch a stuck decode or encode.
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 300;

/// Options controlling a batch run. Loadable from JSON; missing keys take defaults.
///
/// ```json
/// { "workers": 8, "job_timeout_secs": 120, "format": "edges", "background": "#000000" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchOpts {
    /// Worker threads. `None` uses the available parallelism. Always clamped to the job count.
    pub workers: Option<usize>,
    /// Per-job timeout in seconds. `None` disables it.
    pub job_timeout_secs: Option<u64>,
    /// Child shape to read from each `frame` element.
    pub format: DescriptorFormat,
    /// Background for generated frames.
    pub background: Rgb8,
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self {
            workers: None,
            job_timeout_secs: Some(DEFAULT_JOB_TIMEOUT_SECS),
            format: DescriptorFormat::Auto,
            background: Rgb8::WHITE,
        }
    }
}

impl BatchOpts {
    pub fn from_json_str(json: &str) -> BorderResult<Self> {
        let opts: Self = serde_json::from_str(json)
            .map_err(|e| BorderError::validation(format!("batch options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn from_json_file(path: &Path) -> BorderResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BorderError::validation(format!("read batch options '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> BorderResult<()> {
        if self.workers == Some(0) {
            return Err(BorderError::validation("workers must be >= 1 when set"));
        }
        if self.job_timeout_secs == Some(0) {
            return Err(BorderError::validation(
                "job_timeout_secs must be >= 1 when set",
            ));
        }
        Ok(())
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_secs.map(Duration::from_secs)
    }

    /// Pool size for `jobs` work items: requested or available parallelism, clamped to `1..=jobs`.
    pub fn resolve_workers(&self, jobs: usize) -> BorderResult<usize> {
        self.validate()?;
        let requested = self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        });
        Ok(requested.min(jobs).max(1))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/config.rs"]
mod tests;
