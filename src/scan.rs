use crate::{
    error::{RunViolation, Violation},
    table::SampleTable,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inclusive row range `[lo, hi]` sharing one device and one job label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run {
    pub lo: usize,
    pub hi: usize,
}

impl Run {
    pub fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    pub fn len(&self) -> usize {
        (self.hi + 1).saturating_sub(self.lo)
    }

    pub fn is_empty(&self) -> bool {
        self.hi < self.lo
    }
}

/// Splits the table into maximal same-(device, job) runs, in table order.
pub fn scan_runs(table: &SampleTable) -> Vec<Run> {
    let samples = table.samples();
    let mut runs = Vec::new();
    if samples.is_empty() {
        return runs;
    }

    let mut lo = 0;
    for (i, pair) in samples.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.job_label != prev.job_label || cur.device != prev.device {
            runs.push(Run::new(lo, i));
            lo = i + 1;
        }
    }
    runs.push(Run::new(lo, samples.len() - 1));
    runs
}

/// Reports every run that breaks the table ordering invariants.
///
/// The first block of a device or of a (device, job) pair is always accepted.
/// Every run on a device after that device's block has ended is flagged, as
/// is a later block reusing a (device, job) pair or a run whose timestamps go
/// backwards. At most one violation is reported per run.
pub fn check_runs(table: &SampleTable, runs: &[Run]) -> Vec<RunViolation> {
    let samples = table.samples();
    // devices whose first block has ended, with the row it ended at
    let mut closed: HashMap<&str, usize> = HashMap::new();
    let mut job_end: HashMap<(&str, &str), usize> = HashMap::new();
    let mut prev: Option<(&str, usize)> = None;
    let mut out = Vec::new();

    for &run in runs {
        if run.is_empty() || run.hi >= samples.len() {
            out.push(RunViolation {
                run,
                violation: Violation::EmptyRun {
                    lo: run.lo,
                    hi: run.hi,
                },
            });
            continue;
        }

        let first = &samples[run.lo];
        let device = first.device.as_str();
        let job = first.job_label.as_str();

        match prev {
            Some((prev_device, prev_hi)) if prev_device != device => {
                closed.entry(prev_device).or_insert(prev_hi);
            }
            _ => {}
        }

        let violation = if let Some(&previous_end) = closed.get(device) {
            Some(Violation::NonContiguousDevice {
                device: device.to_string(),
                at: run.lo,
                previous_end,
            })
        } else if let Some(&previous_end) = job_end.get(&(device, job)) {
            Some(Violation::NonContiguousJob {
                device: device.to_string(),
                job: job.to_string(),
                at: run.lo,
                previous_end,
            })
        } else {
            time_violation(table, run)
        };

        job_end.entry((device, job)).or_insert(run.hi);
        prev = Some((device, run.hi));

        if let Some(violation) = violation {
            out.push(RunViolation { run, violation });
        }
    }
    out
}

fn time_violation(table: &SampleTable, run: Run) -> Option<Violation> {
    let rows = &table.samples()[run.lo..=run.hi];
    rows.windows(2).enumerate().find_map(|(k, w)| {
        (w[1].time < w[0].time).then(|| Violation::TimeNotOrdered {
            at: run.lo + k + 1,
            previous: w[0].time,
            time: w[1].time,
        })
    })
}

