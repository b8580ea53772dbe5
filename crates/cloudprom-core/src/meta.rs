//! Metric metadata as published by the monitoring catalog.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::{CloudPromError, Result};

/// Native statistic declared for one supported period.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeriodStat {
    pub period_seconds: u64,
    /// e.g. "sum", "avg", "max", "last".
    pub stat_type: String,
}

/// Catalog entry for a single metric of a namespace.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricMetadata {
    pub namespace: String,
    pub metric_name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub meaning: String,
    /// Supported dimension names. Unique; iteration is sorted.
    #[serde(default)]
    pub dimensions: BTreeSet<String>,
    #[serde(default)]
    pub periods: Vec<PeriodStat>,
}

impl MetricMetadata {
    pub fn new(namespace: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
            unit: String::new(),
            meaning: String::new(),
            dimensions: BTreeSet::new(),
            periods: Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = meaning.into();
        self
    }

    pub fn with_dimension(mut self, name: impl Into<String>) -> Self {
        self.dimensions.insert(name.into());
        self
    }

    pub fn with_period(mut self, period_seconds: u64, stat_type: impl Into<String>) -> Self {
        self.periods.push(PeriodStat {
            period_seconds,
            stat_type: stat_type.into(),
        });
        self
    }

    /// Add a dimension the catalog omits. Returns false if it was already present.
    pub fn ensure_dimension(&mut self, name: &str) -> bool {
        if self.dimensions.contains(name) {
            return false;
        }
        self.dimensions.insert(name.to_string())
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.contains(name)
    }

    /// Native statistic type for `period_seconds`.
    pub fn stat_type(&self, period_seconds: u64) -> Result<&str> {
        self.periods
            .iter()
            .find(|p| p.period_seconds == period_seconds)
            .map(|p| p.stat_type.as_str())
            .ok_or_else(|| {
                CloudPromError::Configuration(format!(
                    "{}.{} has no statistic for period {}s",
                    self.namespace, self.metric_name, period_seconds
                ))
            })
    }
}
