use crate::{scan::Run, settings::Settings, table::SampleTable};
use serde::{Deserialize, Serialize};

/// Where the compute window of a run sits and how much idle time surrounds it.
///
/// Durations are in minutes; `compute_lo`/`compute_hi` are absolute table rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdleWindow {
    pub idle_lead: f64,
    pub idle_tail: f64,
    pub idle_mid: f64,
    pub compute_lo: usize,
    pub compute_hi: usize,
}

impl IdleWindow {
    /// Number of samples inside the compute window (never zero).
    pub fn sample_count(&self) -> usize {
        self.compute_hi + 1 - self.compute_lo
    }
}

/// Per-sample idle flags for `run`, indexed from the run start.
pub fn under_mask(table: &SampleTable, run: Run, settings: &Settings) -> Vec<bool> {
    table.samples()[run.lo..=run.hi]
        .iter()
        .map(|s| settings.is_under(s.util))
        .collect()
}

/// Locates the compute window of `run` from its idle flags.
///
/// `under` is run-local and must have `run.len()` entries. A run with no
/// active sample has nothing to anchor a window on, so the whole run becomes
/// the window and every idle duration is zero.
pub fn segment(run: Run, under: &[bool], interval: f64) -> IdleWindow {
    debug_assert_eq!(under.len(), run.len());

    let (Some(first_active), Some(last_active)) = (
        under.iter().position(|&u| !u),
        under.iter().rposition(|&u| !u),
    ) else {
        return IdleWindow {
            idle_lead: 0.0,
            idle_tail: 0.0,
            idle_mid: 0.0,
            compute_lo: run.lo,
            compute_hi: run.hi,
        };
    };

    let n = under.len();
    // offset k marks a flip between samples k and k+1
    let first_flip = under.windows(2).position(|w| w[0] != w[1]);
    let last_flip = under.windows(2).rposition(|w| w[0] != w[1]);

    let idle_lead = match first_flip {
        Some(k) if under[0] => (k + 1) as f64 * interval,
        _ => 0.0,
    };
    let idle_tail = match last_flip {
        Some(k) if under[n - 1] => (n - k - 1) as f64 * interval,
        _ => 0.0,
    };

    let mid_idle = under[first_active..=last_active]
        .iter()
        .filter(|&&u| u)
        .count();

    IdleWindow {
        idle_lead,
        idle_tail,
        idle_mid: mid_idle as f64 * interval,
        compute_lo: run.lo + first_active,
        compute_hi: run.lo + last_active,
    }
}
