//! File-backed catalog and sample source.
//!
//! Replays a JSON capture so the exporter runs end-to-end without the cloud
//! transport. Sample timestamps in the file are offsets in seconds relative
//! to the end of each query window (`0` = newest, `-60` = one minute older).
//!
//! ```json
//! {
//!   "namespaces": {
//!     "QCE/LB_PUBLIC": {
//!       "metrics": [{ "namespace": "QCE/LB_PUBLIC", "metric_name": "ClientConnum",
//!                     "dimensions": ["vip"], "periods": [{"period_seconds": 60, "stat_type": "sum"}] }],
//!       "instances": [{ "id": "10.0.0.1", "attributes": {"LoadBalancerName": "web"} }],
//!       "samples": [{ "metric": "ClientConnum", "labels": {"vip": "10.0.0.1"},
//!                     "points": [{"timestamp": -60, "value": 3.0}, {"timestamp": 0, "value": 4.0}] }]
//!     }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use cloudprom_core::error::{CloudPromError, Result};
use cloudprom_core::series::series_id;
use cloudprom_core::{Instance, MetricMetadata, Sample, SampleSet, Series};

use super::{CatalogSource, SampleRepository};
use crate::metric::Metric;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReplayFile {
    #[serde(default)]
    namespaces: HashMap<String, ReplayNamespace>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReplayNamespace {
    #[serde(default)]
    metrics: Vec<MetricMetadata>,
    #[serde(default)]
    instances: Vec<Instance>,
    #[serde(default)]
    samples: Vec<ReplaySeries>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReplaySeries {
    metric: String,
    labels: BTreeMap<String, String>,
    points: Vec<Sample>,
}

pub struct ReplaySource {
    namespaces: HashMap<String, ReplayNamespace>,
}

impl ReplaySource {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let s = fs::read_to_string(path)
            .map_err(|e| CloudPromError::Internal(format!("read replay file failed: {e}")))?;
        Self::load_from_str(&s)
    }

    pub fn load_from_str(s: &str) -> Result<Self> {
        let file: ReplayFile = serde_json::from_str(s)
            .map_err(|e| CloudPromError::Configuration(format!("invalid replay json: {e}")))?;
        Ok(Self {
            namespaces: file.namespaces,
        })
    }

    fn namespace(&self, namespace: &str) -> Result<&ReplayNamespace> {
        self.namespaces
            .get(namespace)
            .ok_or_else(|| CloudPromError::Repository(format!("no replay data for {namespace}")))
    }
}

#[async_trait]
impl CatalogSource for ReplaySource {
    async fn list_metadata(&self, namespace: &str) -> Result<Vec<MetricMetadata>> {
        Ok(self.namespace(namespace)?.metrics.clone())
    }

    async fn list_instances(&self, namespace: &str) -> Result<Vec<Instance>> {
        Ok(self.namespace(namespace)?.instances.clone())
    }
}

#[async_trait]
impl SampleRepository for ReplaySource {
    async fn list_samples(
        &self,
        metric: &Metric,
        batch: &[Arc<Series>],
        start: i64,
        end: i64,
    ) -> Result<Vec<SampleSet>> {
        let ns = self.namespace(&metric.meta().namespace)?;
        let wanted: HashSet<&str> = batch.iter().map(|s| s.id.as_str()).collect();

        let mut out = Vec::new();
        for rs in &ns.samples {
            if !rs.metric.eq_ignore_ascii_case(&metric.meta().metric_name) {
                continue;
            }
            let id = series_id(&rs.labels);
            if !wanted.contains(id.as_str()) {
                continue;
            }
            let samples: Vec<Sample> = rs
                .points
                .iter()
                .map(|p| Sample::new(end.saturating_add(p.timestamp), p.value))
                .filter(|p| (start..=end).contains(&p.timestamp))
                .collect();
            out.push(SampleSet::new(id, samples));
        }
        Ok(out)
    }
}
