//! Shared application state for the exporter.
//!
//! Built once at startup: resolves a handler per configured product through
//! the registry, loads each namespace's catalog and keeps the collectors,
//! repository handles and exposition cache for the pollers and `/metrics`.

use std::collections::HashSet;
use std::sync::Arc;

use cloudprom_core::error::Result;

use crate::collector::{CollectSettings, ProductCollector};
use crate::config::ExporterConfig;
use crate::handler::{HandlerContext, HandlerRegistry};
use crate::obs::{ExportCache, ExporterMetrics};
use crate::repository::{CatalogSource, SampleRepository};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    collectors: Vec<Arc<ProductCollector>>,
    catalog: Arc<dyn CatalogSource>,
    repository: Arc<dyn SampleRepository>,
    cache: ExportCache,
    metrics: ExporterMetrics,
}

impl AppState {
    /// Build application state.
    ///
    /// A configured namespace missing from the registry fails startup. A
    /// namespace whose catalog cannot be loaded is skipped with a warning,
    /// and so is any metric whose exported name is already taken.
    pub async fn new(
        cfg: ExporterConfig,
        registry: &HandlerRegistry,
        catalog: Arc<dyn CatalogSource>,
        repository: Arc<dyn SampleRepository>,
    ) -> Result<Self> {
        let mut collectors = Vec::new();
        let mut claimed = HashSet::new();

        for product in &cfg.products {
            let ns = product.namespace.as_str();
            let enabled = match product.enabled {
                Some(e) => {
                    // still surfaces NotFound for unregistered namespaces
                    registry.enabled_by_default(ns)?;
                    e
                }
                None => registry.enabled_by_default(ns)?,
            };
            if !enabled {
                tracing::info!(namespace=%ns, "product disabled");
                continue;
            }

            let handler = registry.construct(ns, &HandlerContext)?;

            match ProductCollector::init(
                handler,
                product,
                &cfg.exporter.namespace_prefix,
                catalog.as_ref(),
                &mut claimed,
            )
            .await
            {
                Ok(pc) => collectors.push(Arc::new(pc)),
                Err(e) => {
                    tracing::warn!(namespace=%ns, err=%e, "catalog load failed; product skipped")
                }
            }
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                collectors,
                catalog,
                repository,
                cache: ExportCache::new(),
                metrics: ExporterMetrics::default(),
            }),
        })
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn collectors(&self) -> &[Arc<ProductCollector>] {
        &self.inner.collectors
    }

    pub fn catalog(&self) -> Arc<dyn CatalogSource> {
        Arc::clone(&self.inner.catalog)
    }

    pub fn repository(&self) -> Arc<dyn SampleRepository> {
        Arc::clone(&self.inner.repository)
    }

    pub fn cache(&self) -> &ExportCache {
        &self.inner.cache
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.inner.metrics
    }

    pub fn collect_settings(&self) -> CollectSettings {
        let ex = &self.inner.cfg.exporter;
        CollectSettings {
            batch_size: ex.batch_size(),
            query_timeout: ex.query_timeout(),
            max_concurrency: ex.max_concurrency,
        }
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    /// Full `/metrics` body: polled gauges followed by exporter self-metrics.
    pub fn render_metrics(&self) -> String {
        let mut out = String::new();
        self.inner.cache.render(&mut out);
        self.inner.metrics.render(&mut out);
        out
    }
}
