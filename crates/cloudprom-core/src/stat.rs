//! Statistic selection over a sample window.
//!
//! All functions here are pure; concurrent pollers call them without sharing
//! any state.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{CloudPromError, Result};
use crate::series::{Sample, SampleSet};

/// Requested statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatType {
    Last,
    Max,
    Min,
    Avg,
}

impl StatType {
    pub fn as_str(self) -> &'static str {
        match self {
            StatType::Last => "last",
            StatType::Max => "max",
            StatType::Min => "min",
            StatType::Avg => "avg",
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatType {
    type Err = CloudPromError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "last" => Ok(StatType::Last),
            "max" => Ok(StatType::Max),
            "min" => Ok(StatType::Min),
            "avg" => Ok(StatType::Avg),
            other => Err(CloudPromError::Configuration(format!(
                "unknown stat type: {other}"
            ))),
        }
    }
}

/// Pick the representative sample of `set` for `stat`.
///
/// `window_end` stamps the synthetic `avg` sample.
pub fn aggregate(stat: StatType, set: &SampleSet, window_end: i64) -> Result<Sample> {
    let mut it = set.samples.iter().copied();
    let first = it
        .next()
        .ok_or_else(|| CloudPromError::NoData(set.series_id.clone()))?;

    let picked = match stat {
        StatType::Last => it.fold(first, |best, s| {
            if s.timestamp >= best.timestamp { s } else { best }
        }),
        StatType::Max => it.fold(first, |best, s| {
            if s.value > best.value || (s.value == best.value && s.timestamp < best.timestamp) {
                s
            } else {
                best
            }
        }),
        StatType::Min => it.fold(first, |best, s| {
            if s.value < best.value || (s.value == best.value && s.timestamp < best.timestamp) {
                s
            } else {
                best
            }
        }),
        StatType::Avg => {
            let sum: f64 = set.samples.iter().map(|s| s.value).sum();
            Sample::new(window_end, sum / set.samples.len() as f64)
        }
    };
    Ok(picked)
}
