use crate::{config, error::Error, stats::StdEstimator};
use serde::{Deserialize, Serialize};

/// Parameters of the per-run reduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub interval_minutes: f64,
    /// A sample at or below this utilization percent counts as idle.
    #[serde(rename = "under_utilization_threshold_percent")]
    pub threshold_percent: f64,
    pub std_estimator: StdEstimator,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&config::Segment::default())
    }
}

impl From<&config::Segment> for Settings {
    fn from(seg: &config::Segment) -> Self {
        Self {
            interval_minutes: seg.interval_minutes,
            threshold_percent: seg.under_utilization_threshold_percent,
            std_estimator: seg.std_estimator,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.interval_minutes.is_finite() || self.interval_minutes <= 0.0 {
            return Err(Error::InvalidInterval(self.interval_minutes));
        }
        if !(0.0..=100.0).contains(&self.threshold_percent) {
            return Err(Error::InvalidThreshold(self.threshold_percent));
        }
        Ok(())
    }

    pub fn is_under(&self, util: f64) -> bool {
        util <= self.threshold_percent
    }
}
