use crate::config::Input;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One telemetry reading for one GPU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: i64,
    pub device: String,
    pub util: f64,
    #[serde(rename = "job")]
    pub job_label: String,
    #[serde(rename = "rundate")]
    pub run_date: String,
}

impl Sample {
    pub fn new(time: i64, device: &str, util: f64, job_label: &str, run_date: &str) -> Self {
        Self {
            time,
            device: device.to_string(),
            util,
            job_label: job_label.to_string(),
            run_date: run_date.to_string(),
        }
    }
}

/// Ordered, read-only arena of samples.
///
/// Rows are expected grouped by device, and within a device each job's rows
/// form one time-ordered block. The table does not enforce that ordering;
/// [`crate::scan::check_runs`] reports runs that break it.
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    samples: Vec<Sample>,
}

impl SampleTable {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn load(path: &Path, cfg: &Input) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open sample table: {}", path.display()))?;
        Self::read_csv(file, cfg).with_context(|| format!("reading {}", path.display()))
    }

    /// Reads a clean CSV table with at least `time,device,util,job,rundate`
    /// columns. Unparseable rows are an error; nothing is repaired.
    pub fn read_csv<R: Read>(reader: R, cfg: &Input) -> Result<Self> {
        let run_date_re = Regex::new(r"^\d{4}$")?;
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut samples = Vec::new();
        let mut dropped = 0usize;
        for rec in rdr.records() {
            let rec = rec?;
            let line = rec.position().map(|p| p.line()).unwrap_or(0);
            let sample: Sample = rec
                .deserialize(Some(&headers))
                .with_context(|| format!("line {line}"))?;

            if cfg.drop_unassigned && sample.job_label == cfg.unassigned_marker {
                dropped += 1;
                continue;
            }
            if !sample.util.is_finite() || !(0.0..=100.0).contains(&sample.util) {
                return Err(anyhow!("line {line}: util out of range: {}", sample.util));
            }
            if !run_date_re.is_match(&sample.run_date) {
                return Err(anyhow!(
                    "line {line}: rundate is not YYMM: {:?}",
                    sample.run_date
                ));
            }
            samples.push(sample);
        }

        debug!("loaded {} samples, dropped {} unassigned", samples.len(), dropped);
        Ok(Self::new(samples))
    }
}

impl From<Vec<Sample>> for SampleTable {
    fn from(samples: Vec<Sample>) -> Self {
        Self::new(samples)
    }
}
