//! Per-metric export configuration.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{CloudPromError, Result};
use crate::stat::StatType;

/// How the displayed metric name is formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameStyle {
    /// camelCase -> snake_case.
    #[default]
    Underscore,
    /// Lower-cased verbatim.
    Lowercase,
}

/// Export configuration resolved for one metric.
#[derive(Debug, Clone)]
pub struct MetricConfig {
    pub namespace_prefix: String,
    pub product_name: String,
    pub stat_types: Vec<StatType>,
    pub custom_metric_name: Option<String>,
    pub name_style: NameStyle,
    pub const_labels: BTreeMap<String, String>,
    pub instance_label_names: Vec<String>,
    pub stat_period_seconds: u64,
    pub stat_num_samples: u64,
}

impl MetricConfig {
    pub fn new(namespace_prefix: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            namespace_prefix: namespace_prefix.into(),
            product_name: product_name.into(),
            stat_types: vec![StatType::Last],
            custom_metric_name: None,
            name_style: NameStyle::default(),
            const_labels: BTreeMap::new(),
            instance_label_names: Vec::new(),
            stat_period_seconds: 60,
            stat_num_samples: 1,
        }
    }

    /// Length of the sampling window in seconds.
    pub fn window_seconds(&self) -> u64 {
        self.stat_num_samples.saturating_mul(self.stat_period_seconds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stat_types.is_empty() {
            return Err(CloudPromError::Configuration(
                "stat_types must not be empty".into(),
            ));
        }
        for (i, st) in self.stat_types.iter().enumerate() {
            if self.stat_types[..i].contains(st) {
                return Err(CloudPromError::Configuration(format!(
                    "duplicate stat type: {}",
                    st.as_str()
                )));
            }
        }
        if self.stat_period_seconds == 0 || self.stat_num_samples == 0 {
            return Err(CloudPromError::Configuration(
                "stat_period_seconds and stat_num_samples must be > 0".into(),
            ));
        }
        Ok(())
    }
}
