use crate::{
    error::{Error, RunViolation},
    identity::{DeviceCodes, JobIdentity},
    scan::{check_runs, scan_runs, Run},
    segment::{segment, under_mask, IdleWindow},
    settings::Settings,
    stats::{aggregate, JobStats},
    table::SampleTable,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// One output row: a run's identity columns followed by its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job: String,
    pub device: u32,
    pub device_name: String,
    pub job_id: String,
    pub task_id: String,
    pub run_date: String,
    pub idle_start: f64,
    pub idle_end: f64,
    pub idle_mid: f64,
    pub comp_tot: f64,
    pub comp_active: f64,
    pub comp_time: f64,
    pub comp_frac: f64,
    pub comp_std: f64,
    pub tot_time: f64,
}

impl JobRecord {
    pub fn new(identity: JobIdentity, device_name: &str, stats: &JobStats) -> Self {
        Self {
            job: identity.composite_key,
            device: identity.device_code,
            device_name: device_name.to_string(),
            job_id: identity.job_id,
            task_id: identity.task_id,
            run_date: identity.run_date,
            idle_start: stats.idle_start,
            idle_end: stats.idle_end,
            idle_mid: stats.idle_mid,
            comp_tot: stats.comp_tot,
            comp_active: stats.comp_active,
            comp_time: stats.comp_time,
            comp_frac: stats.comp_frac,
            comp_std: stats.comp_std,
            tot_time: stats.tot_time,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reduction {
    pub run_count: usize,
    pub records: Vec<JobRecord>,
    pub violations: Vec<RunViolation>,
    /// Distinct devices in device-code order.
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    /// Worker count; 0 lets rayon choose.
    Threads(usize),
}

pub struct Reducer {
    settings: Settings,
    pool: Option<rayon::ThreadPool>,
}

impl Reducer {
    pub fn new(settings: Settings, parallelism: Parallelism) -> Result<Self, Error> {
        settings.validate()?;
        let pool = match parallelism {
            Parallelism::Sequential => None,
            Parallelism::Threads(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("jobstats-{i}"))
                    .build()?,
            ),
        };
        Ok(Self { settings, pool })
    }

    pub fn sequential(settings: Settings) -> Result<Self, Error> {
        Self::new(settings, Parallelism::Sequential)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn reduce(&self, table: &SampleTable) -> Reduction {
        let started = Instant::now();

        let runs = scan_runs(table);
        let violations = check_runs(table, &runs);
        let rejected: HashSet<Run> = violations.iter().map(|v| v.run).collect();
        let accepted: Vec<Run> = runs
            .iter()
            .copied()
            .filter(|r| !rejected.contains(r))
            .collect();
        debug!(
            "scanned {} runs, {} rejected",
            runs.len(),
            violations.len()
        );

        let settings = &self.settings;
        let per_run = |&run: &Run| (run, reduce_run(table, run, settings).1);
        let stats: Vec<(Run, JobStats)> = match &self.pool {
            Some(pool) => pool.install(|| accepted.par_iter().map(per_run).collect()),
            None => accepted.iter().map(per_run).collect(),
        };

        let samples = table.samples();
        let codes = DeviceCodes::factorize(
            stats.iter().map(|(run, _)| samples[run.lo].device.as_str()),
        );
        let records: Vec<JobRecord> = stats
            .iter()
            .zip(&codes.codes)
            .map(|((run, st), &code)| {
                let first = &samples[run.lo];
                let identity = JobIdentity::resolve(&first.job_label, &first.run_date, code);
                JobRecord::new(identity, &first.device, st)
            })
            .collect();

        info!(
            "reduced {} samples into {} records across {} devices in {:?}",
            table.len(),
            records.len(),
            codes.uniques.len(),
            started.elapsed()
        );

        Reduction {
            run_count: runs.len(),
            records,
            violations,
            devices: codes.uniques,
        }
    }
}

/// Segments and aggregates a single run. Pure in all arguments.
pub fn reduce_run(table: &SampleTable, run: Run, settings: &Settings) -> (IdleWindow, JobStats) {
    let under = under_mask(table, run, settings);
    let window = segment(run, &under, settings.interval_minutes);
    let stats = aggregate(table, run, &window, &under, settings);
    (window, stats)
}
