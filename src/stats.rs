use crate::{scan::Run, segment::IdleWindow, settings::Settings, table::SampleTable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdEstimator {
    /// Divide by n-1.
    #[default]
    Sample,
    /// Divide by n.
    Population,
}

impl StdEstimator {
    fn ddof(self) -> usize {
        match self {
            StdEstimator::Sample => 1,
            StdEstimator::Population => 0,
        }
    }
}

/// Usage summary of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobStats {
    pub idle_start: f64,
    pub idle_end: f64,
    pub idle_mid: f64,
    /// Utilization area over the compute window, in GPU-minutes.
    pub comp_tot: f64,
    /// As `comp_tot`, counting active samples only.
    pub comp_active: f64,
    pub comp_time: f64,
    pub comp_frac: f64,
    pub comp_std: f64,
    pub tot_time: f64,
}

pub fn aggregate(
    table: &SampleTable,
    run: Run,
    window: &IdleWindow,
    under: &[bool],
    settings: &Settings,
) -> JobStats {
    let interval = settings.interval_minutes;
    let utils: Vec<f64> = table.samples()[window.compute_lo..=window.compute_hi]
        .iter()
        .map(|s| s.util)
        .collect();
    let under_w = &under[window.compute_lo - run.lo..=window.compute_hi - run.lo];

    let total: f64 = utils.iter().sum();
    let active: f64 = utils
        .iter()
        .zip(under_w)
        .filter(|&(_, &u)| !u)
        .map(|(v, _)| v)
        .sum();

    let comp_time = window.sample_count() as f64 * interval;
    let comp_tot = total / 100.0 * interval;
    let comp_frac = if comp_time > 0.0 {
        (comp_tot / comp_time).clamp(0.0, 1.0)
    } else {
        0.0
    };

    JobStats {
        idle_start: window.idle_lead,
        idle_end: window.idle_tail,
        idle_mid: window.idle_mid,
        comp_tot,
        comp_active: active / 100.0 * interval,
        comp_time,
        comp_frac,
        comp_std: std_dev(&utils, settings.std_estimator) / 100.0,
        tot_time: run.len() as f64 * interval,
    }
}

/// Standard deviation of `values`; 0 when the estimator is undefined
/// (fewer than `ddof + 1` values).
pub fn std_dev(values: &[f64], estimator: StdEstimator) -> f64 {
    let n = values.len();
    let ddof = estimator.ddof();
    if n <= ddof || n == 0 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (n - ddof) as f64).sqrt()
}
