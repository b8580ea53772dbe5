//! Collaborator contracts for the monitoring API.
//!
//! The authenticated HTTP client lives outside this crate; anything that can
//! answer these calls (including [`ReplaySource`]) plugs into the pipeline.

pub mod replay;

use std::sync::Arc;

use async_trait::async_trait;

use cloudprom_core::error::Result;
use cloudprom_core::{Instance, MetricMetadata, SampleSet, Series};

use crate::metric::Metric;

pub use replay::ReplaySource;

/// Bulk sample queries.
#[async_trait]
pub trait SampleRepository: Send + Sync {
    /// Samples of `batch` within `[start, end]` (unix seconds).
    ///
    /// Entries may come back in any order; a series with no data may be
    /// left out entirely.
    async fn list_samples(
        &self,
        metric: &Metric,
        batch: &[Arc<Series>],
        start: i64,
        end: i64,
    ) -> Result<Vec<SampleSet>>;
}

/// Metric catalog and instance inventory for a namespace.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_metadata(&self, namespace: &str) -> Result<Vec<MetricMetadata>>;
    async fn list_instances(&self, namespace: &str) -> Result<Vec<Instance>>;
}
