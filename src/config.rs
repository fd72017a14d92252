use crate::stats::StdEstimator;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub segment: Segment,
    #[serde(default)]
    pub parallel: Parallel,
    #[serde(default)]
    pub input: Input,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    /// Fail the invocation if any run violates the table ordering invariants.
    pub strict: bool,
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            strict: false,
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub interval_minutes: f64,
    pub under_utilization_threshold_percent: f64,
    pub std_estimator: StdEstimator,
}
impl Default for Segment {
    fn default() -> Self {
        Self {
            interval_minutes: 5.0,
            under_utilization_threshold_percent: 5.0,
            std_estimator: StdEstimator::Sample,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parallel {
    pub enabled: bool,
    /// 0 lets rayon pick (one worker per logical CPU).
    pub threads: usize,
}
impl Default for Parallel {
    fn default() -> Self {
        Self {
            enabled: true,
            threads: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    pub drop_unassigned: bool,
    pub unassigned_marker: String,
}
impl Default for Input {
    fn default() -> Self {
        Self {
            drop_unassigned: true,
            unassigned_marker: "-".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub format: OutputFormat,
    pub out_dir: String,
    /// Table file name; its extension is replaced to match `format`.
    pub filename: String,
    pub write_summary_json: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            out_dir: "out".into(),
            filename: "job_stats.csv".into(),
            write_summary_json: true,
        }
    }
}

impl Output {
    pub fn table_file_name(&self) -> PathBuf {
        Path::new(&self.filename).with_extension(self.format.extension())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
