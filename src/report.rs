use crate::{
    config::OutputFormat,
    error::RunViolation,
    reduce::{JobRecord, Reduction},
    scan::Run,
    settings::Settings,
};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub input: String,
    pub input_sha256: String,
    pub output_sha256: String,
    pub started: String,
    pub finished: String,
    pub samples: usize,
    pub runs: usize,
    pub records: usize,
    pub devices: Vec<String>,
    pub settings: Settings,
    pub violations: Vec<RunViolation>,
}

impl Summary {
    pub fn new(
        input: &Path,
        input_sha256: String,
        samples: usize,
        red: &Reduction,
        settings: &Settings,
    ) -> Self {
        Self {
            input: input.display().to_string(),
            input_sha256,
            output_sha256: String::new(),
            started: String::new(),
            finished: String::new(),
            samples,
            runs: red.run_count,
            records: red.records.len(),
            devices: red.devices.clone(),
            settings: *settings,
            violations: red.violations.clone(),
        }
    }
}

pub fn records_to_csv(records: &[JobRecord]) -> Result<String> {
    let mut w = csv::Writer::from_writer(Vec::new());
    for r in records {
        w.serialize(r)?;
    }
    let bytes = w.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Output of the `check` command.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub input: String,
    pub samples: usize,
    pub runs: Vec<Run>,
    pub violations: Vec<RunViolation>,
}

pub fn render(records: &[JobRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => records_to_csv(records),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
    }
}
