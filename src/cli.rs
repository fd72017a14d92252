use crate::{
    config::Config,
    reduce::{Parallelism, Reducer},
    report::{self, CheckReport, Summary},
    scan::{check_runs, scan_runs},
    settings::Settings,
    table::SampleTable,
    util::{ensure_dir, hash_file, now_rfc3339, sha256_hex},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "gpu-jobstats")]
#[command(about = "Reduce per-GPU utilization samples into per-job idle/compute statistics")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./gpu-jobstats.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reduce a sample table into one record per (job, device) run.
    Reduce {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Under-utilization threshold in percent.
        #[arg(long)]
        threshold: Option<f64>,
        /// Minutes between samples.
        #[arg(long)]
        interval: Option<f64>,
    },
    /// Scan and validate run boundaries without computing statistics.
    Check {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the effective configuration.
    Config {},
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref())? {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let out_override = match &args.cmd {
        Command::Reduce { out_dir, .. } => out_dir.as_deref(),
        _ => None,
    };
    let log_path = resolve_log_path(&cfg, out_override);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    match &args.cmd {
        Command::Reduce {
            input,
            out_dir,
            threshold,
            interval,
        } => {
            let mut cfg = cfg.clone();
            if let Some(t) = threshold {
                cfg.segment.under_utilization_threshold_percent = *t;
            }
            if let Some(m) = interval {
                cfg.segment.interval_minutes = *m;
            }
            reduce(&cfg, input, out_dir.as_deref())
        }
        Command::Check { input } => check(&cfg, input),
        Command::Config {} => {
            print!("{}", toml::to_string(&cfg)?);
            Ok(())
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(p) = user {
        return Ok(Some(p.to_path_buf()));
    }
    for candidate in ["gpu-jobstats.toml", "gpu-jobstats.example.toml"] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return Ok(Some(p));
        }
    }
    Ok(None)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the result table; logs go to stderr
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn reducer_for(cfg: &Config) -> Result<Reducer> {
    let parallelism = if cfg.parallel.enabled {
        Parallelism::Threads(cfg.parallel.threads)
    } else {
        Parallelism::Sequential
    };
    Reducer::new(Settings::from(&cfg.segment), parallelism).with_context(|| "invalid [segment] settings")
}

fn reduce(cfg: &Config, input: &Path, out_override: Option<&Path>) -> Result<()> {
    let reducer = reducer_for(cfg)?;
    let started = now_rfc3339();

    let table = SampleTable::load(input, &cfg.input)?;
    let input_hash = hash_file(input)?;
    info!("input={} samples={} sha256={}", input.display(), table.len(), input_hash);

    let reduction = reducer.reduce(&table);
    for v in &reduction.violations {
        warn!("run omitted: {v}");
    }
    if cfg.global.strict && !reduction.violations.is_empty() {
        return Err(anyhow!(
            "{} run(s) violate the table ordering invariants and strict=true",
            reduction.violations.len()
        ));
    }

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.output.out_dir));
    ensure_dir(&out_root)?;

    let body = report::render(&reduction.records, cfg.output.format)?;
    let out_path = out_root.join(cfg.output.table_file_name());
    std::fs::write(&out_path, &body).with_context(|| format!("writing {}", out_path.display()))?;
    info!("wrote {} records to {}", reduction.records.len(), out_path.display());

    let mut summary = Summary::new(input, input_hash, table.len(), &reduction, reducer.settings());
    summary.output_sha256 = sha256_hex(body.as_bytes());
    summary.started = started;
    summary.finished = now_rfc3339();

    if cfg.output.write_summary_json {
        std::fs::write(
            out_root.join("summary.json"),
            serde_json::to_string_pretty(&summary)?,
        )?;
    }

    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "output": out_path,
                "runs": summary.runs,
                "records": summary.records,
                "violations": summary.violations.len(),
                "status": "ok"
            }))?
        );
    }

    Ok(())
}

/// Scans and validates `input` without reducing it.
pub fn check_table(cfg: &Config, input: &Path) -> Result<CheckReport> {
    let table = SampleTable::load(input, &cfg.input)?;
    let runs = scan_runs(&table);
    let violations = check_runs(&table, &runs);
    Ok(CheckReport {
        input: input.display().to_string(),
        samples: table.len(),
        runs,
        violations,
    })
}

fn check(cfg: &Config, input: &Path) -> Result<()> {
    let report = check_table(cfg, input)?;
    for v in &report.violations {
        warn!("{v}");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    if cfg.global.strict && !report.violations.is_empty() {
        return Err(anyhow!(
            "{} run(s) violate the table ordering invariants",
            report.violations.len()
        ));
    }
    Ok(())
}

fn resolve_log_path(cfg: &Config, out_override: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.output.out_dir));
    Some(out_root.join("gpu-jobstats.log"))
}
