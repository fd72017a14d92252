use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Task id the scheduler writes for jobs without a task array.
const NO_TASK: &str = "undefined";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobIdentity {
    pub job_id: String,
    pub task_id: String,
    pub run_date: String,
    /// `<job_id>.<task_id>.<run_date>`, the accounting join key.
    pub composite_key: String,
    /// Dense per-invocation device index; do not persist.
    pub device_code: u32,
}

impl JobIdentity {
    pub fn resolve(job_label: &str, run_date: &str, device_code: u32) -> Self {
        let (job_id, task_id) = split_label(job_label);
        Self {
            composite_key: composite_key(job_label, run_date),
            job_id: job_id.to_string(),
            task_id: task_id.to_string(),
            run_date: run_date.to_string(),
            device_code,
        }
    }
}

/// Splits `"<job>.<task>"` on the first dot, mapping a missing or
/// `undefined` task to `"0"`.
pub fn split_label(label: &str) -> (&str, &str) {
    match label.split_once('.') {
        Some((job, task)) if task != NO_TASK => (job, task),
        Some((job, _)) => (job, "0"),
        None => (label, "0"),
    }
}

pub fn composite_key(job_label: &str, run_date: &str) -> String {
    let (job, task) = split_label(job_label);
    format!("{job}.{task}.{run_date}")
}

/// Dense device codes in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceCodes {
    /// One code per input device, aligned with the input order.
    pub codes: Vec<u32>,
    /// Distinct devices; `uniques[code]` is the device name.
    pub uniques: Vec<String>,
}

impl DeviceCodes {
    pub fn factorize<'a, I>(devices: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index: HashMap<&'a str, u32> = HashMap::new();
        let mut out = Self::default();
        for dev in devices {
            let next = out.uniques.len() as u32;
            let code = *index.entry(dev).or_insert_with(|| {
                out.uniques.push(dev.to_string());
                next
            });
            out.codes.push(code);
        }
        out
    }
}
