//! Instances, series and samples.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

/// A monitored cloud resource (load balancer, connection, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Instance {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.attributes.insert(k.into(), v.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// One logical time line of a metric.
#[derive(Debug, Clone)]
pub struct Series {
    /// Unique within its metric.
    pub id: String,
    /// Concrete dimension values used to query the repository.
    pub query_labels: BTreeMap<String, String>,
    pub instance: Arc<Instance>,
}

impl Series {
    /// Build a series whose id is derived from its query labels.
    pub fn new(query_labels: BTreeMap<String, String>, instance: Arc<Instance>) -> Self {
        let id = series_id(&query_labels);
        Self {
            id,
            query_labels,
            instance,
        }
    }
}

/// Deterministic id: `k1=v1,k2=v2` over sorted keys.
pub fn series_id(query_labels: &BTreeMap<String, String>) -> String {
    query_labels
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// A single observation (unix seconds, value).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Samples for one series within one query window.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    pub series_id: String,
    pub samples: Vec<Sample>,
}

impl SampleSet {
    pub fn new(series_id: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            series_id: series_id.into(),
            samples,
        }
    }
}
