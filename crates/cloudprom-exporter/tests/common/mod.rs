//! In-memory collaborators for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use cloudprom_core::error::{CloudPromError, Result};
use cloudprom_core::{Instance, MetricMetadata, Sample, SampleSet, Series};
use cloudprom_exporter::metric::Metric;
use cloudprom_exporter::repository::{CatalogSource, SampleRepository};

/// Samples keyed by series id; series without an entry are left out.
#[derive(Default)]
pub struct StaticRepo {
    pub samples: HashMap<String, Vec<Sample>>,
    pub calls: AtomicUsize,
    pub batch_sizes: Mutex<Vec<usize>>,
}

impl StaticRepo {
    pub fn with(mut self, series_id: &str, points: &[(i64, f64)]) -> Self {
        self.samples.insert(
            series_id.to_string(),
            points.iter().map(|&(t, v)| Sample::new(t, v)).collect(),
        );
        self
    }
}

#[async_trait]
impl SampleRepository for StaticRepo {
    async fn list_samples(
        &self,
        _metric: &Metric,
        batch: &[Arc<Series>],
        start: i64,
        end: i64,
    ) -> Result<Vec<SampleSet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch_sizes.lock().unwrap().push(batch.len());
        // reversed to exercise order-independence
        Ok(batch
            .iter()
            .rev()
            .filter_map(|s| {
                self.samples.get(&s.id).map(|pts| {
                    let in_window = pts
                        .iter()
                        .copied()
                        .filter(|p| (start..=end).contains(&p.timestamp))
                        .collect();
                    SampleSet::new(s.id.clone(), in_window)
                })
            })
            .collect())
    }
}

/// Fails on the n-th call (0-based), succeeds with no data otherwise.
pub struct FailingRepo {
    pub fail_on: usize,
    pub calls: AtomicUsize,
}

#[async_trait]
impl SampleRepository for FailingRepo {
    async fn list_samples(
        &self,
        _metric: &Metric,
        _batch: &[Arc<Series>],
        _start: i64,
        _end: i64,
    ) -> Result<Vec<SampleSet>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n == self.fail_on {
            return Err(CloudPromError::Repository("upstream 503".into()));
        }
        Ok(Vec::new())
    }
}

pub struct SlowRepo(pub Duration);

#[async_trait]
impl SampleRepository for SlowRepo {
    async fn list_samples(
        &self,
        _metric: &Metric,
        _batch: &[Arc<Series>],
        _start: i64,
        _end: i64,
    ) -> Result<Vec<SampleSet>> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct StaticCatalog {
    pub metadata: HashMap<String, Vec<MetricMetadata>>,
    pub instances: HashMap<String, Vec<Instance>>,
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn list_metadata(&self, namespace: &str) -> Result<Vec<MetricMetadata>> {
        self.metadata
            .get(namespace)
            .cloned()
            .ok_or_else(|| CloudPromError::Repository(format!("no catalog for {namespace}")))
    }

    async fn list_instances(&self, namespace: &str) -> Result<Vec<Instance>> {
        Ok(self.instances.get(namespace).cloned().unwrap_or_default())
    }
}
