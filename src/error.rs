use crate::scan::Run;
use serde::Serialize;
use thiserror::Error;

/// Failures that stop a reduction before any run is processed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("sampling interval must be a positive number of minutes, got {0}")]
    InvalidInterval(f64),
    #[error("under-utilization threshold must be within [0, 100], got {0}")]
    InvalidThreshold(f64),
    #[error("building worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A broken ordering invariant for one run. The run's record is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("run [{lo}, {hi}] is empty")]
    EmptyRun { lo: usize, hi: usize },
    #[error("device {device} reappears at row {at}; its earlier block ended at row {previous_end}")]
    NonContiguousDevice {
        device: String,
        at: usize,
        previous_end: usize,
    },
    #[error(
        "job {job} on device {device} reappears at row {at}; its earlier block ended at row {previous_end}"
    )]
    NonContiguousJob {
        device: String,
        job: String,
        at: usize,
        previous_end: usize,
    },
    #[error("time goes backwards at row {at} ({previous} -> {time})")]
    TimeNotOrdered { at: usize, previous: i64, time: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunViolation {
    pub run: Run,
    pub violation: Violation,
}

impl std::fmt::Display for RunViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rows {}-{}: {}", self.run.lo, self.run.hi, self.violation)
    }
}
