use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};

use cloudprom_core::error::{CloudPromError, Result};

use crate::config::ProductConfig;
use crate::handler::ProductHandler;
use crate::metric::Metric;
use crate::obs::{ExportCache, ExporterMetrics};
use crate::repository::{CatalogSource, SampleRepository};

/// Knobs shared by every collect cycle.
#[derive(Debug, Clone, Copy)]
pub struct CollectSettings {
    pub batch_size: usize,
    pub query_timeout: Duration,
    pub max_concurrency: usize,
}

/// All metrics of one namespace, customized by its handler.
pub struct ProductCollector {
    handler: Arc<dyn ProductHandler>,
    metrics: Vec<Arc<Metric>>,
}

impl ProductCollector {
    /// Load the catalog and build one `Metric` per accepted metadata entry.
    ///
    /// A metric whose config or metadata is unusable is skipped with a
    /// warning; only a catalog failure fails the namespace. `claimed` holds
    /// the exported names of every metric accepted so far, across products;
    /// a metric reusing one of them is skipped.
    pub async fn init(
        handler: Arc<dyn ProductHandler>,
        product: &ProductConfig,
        namespace_prefix: &str,
        catalog: &dyn CatalogSource,
        claimed: &mut HashSet<String>,
    ) -> Result<Self> {
        let ns = handler.namespace().to_string();
        let metas = catalog.list_metadata(&ns).await?;

        let mut metrics = Vec::new();
        for mut meta in metas {
            if !handler.validate_and_augment_metadata(&mut meta) {
                tracing::debug!(namespace=%ns, metric=%meta.metric_name, "metadata rejected by handler");
                continue;
            }
            if !product.is_metric_selected(&meta.metric_name) {
                continue;
            }

            let conf = product.metric_config(namespace_prefix, &meta.metric_name);
            let name = meta.metric_name.clone();
            let metric = match Metric::new(meta, conf) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(namespace=%ns, metric=%name, err=%e, "skipping metric");
                    continue;
                }
            };
            if !handler.is_metric_included(&metric) {
                tracing::debug!(namespace=%ns, metric=%name, "metric excluded by handler");
                continue;
            }
            if let Err(e) = claim_names(&metric, claimed) {
                tracing::warn!(namespace=%ns, metric=%name, kind=e.kind().as_str(), err=%e, "skipping metric");
                continue;
            }
            metrics.push(Arc::new(metric));
        }

        tracing::info!(namespace=%ns, metrics=metrics.len(), "product collector ready");
        Ok(Self { handler, metrics })
    }

    pub fn namespace(&self) -> &str {
        self.handler.namespace()
    }

    pub fn metrics(&self) -> &[Arc<Metric>] {
        &self.metrics
    }

    /// Rebuild every metric's series set from the current instance list.
    pub async fn reload(&self, catalog: &dyn CatalogSource) -> Result<usize> {
        let instances: Vec<_> = catalog
            .list_instances(self.namespace())
            .await?
            .into_iter()
            .map(Arc::new)
            .collect();

        for m in &self.metrics {
            m.reload_series(self.handler.build_series(m.meta(), &instances));
        }
        Ok(instances.len())
    }

    /// Collect all metrics, at most `max_concurrency` at a time, and publish
    /// the results into `cache`.
    pub async fn collect(
        &self,
        repo: &dyn SampleRepository,
        settings: CollectSettings,
        cache: &ExportCache,
        obs: &ExporterMetrics,
    ) {
        let ns = self.namespace();
        let results = stream::iter(self.metrics.clone())
            .map(|m| async move {
                let started = Instant::now();
                let res = m
                    .collect(repo, settings.batch_size, settings.query_timeout)
                    .await;
                (m, res, started.elapsed())
            })
            .buffer_unordered(settings.max_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        for (m, res, elapsed) in results {
            obs.collect_duration.observe(&[("namespace", ns)], elapsed);
            match res {
                Ok(c) => {
                    obs.poll_cycles.inc(&[("namespace", ns), ("result", "ok")]);
                    obs.series_dropped
                        .add(&[("namespace", ns), ("reason", "no_data")], c.no_data as u64);
                    obs.series_dropped.add(
                        &[("namespace", ns), ("reason", "missing_value")],
                        c.missing_value as u64,
                    );
                    cache.publish(m.id(), c.metrics);
                }
                Err(e) => {
                    obs.poll_cycles.inc(&[("namespace", ns), ("result", "error")]);
                    tracing::warn!(namespace=%ns, metric=%m.id(), kind=e.kind().as_str(), err=%e, "collect failed");
                    cache.remove(m.id());
                }
            }
        }
    }
}

/// Reserve every exported name of `metric`, or none of them.
fn claim_names(metric: &Metric, claimed: &mut HashSet<String>) -> Result<()> {
    if let Some(d) = metric
        .descriptors()
        .iter()
        .find(|d| claimed.contains(&d.fq_name))
    {
        return Err(CloudPromError::Configuration(format!(
            "metric name {} already exported by another metric",
            d.fq_name
        )));
    }
    claimed.extend(metric.descriptors().iter().map(|d| d.fq_name.clone()));
    Ok(())
}
