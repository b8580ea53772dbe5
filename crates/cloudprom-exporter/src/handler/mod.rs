//! Per-namespace capability hooks.
//!
//! Every product namespace plugs into the shared pipeline through a
//! [`ProductHandler`]. The optional hooks have engine defaults; an adapter
//! embeds a [`BaseHandler`] and overrides only what it changes.

pub mod clb;
pub mod clb7;
pub mod dcx;
pub mod registry;

use std::collections::BTreeMap;
use std::sync::Arc;

use cloudprom_core::{Instance, MetricMetadata, Series};

use crate::metric::Metric;

pub use registry::{HandlerCtor, HandlerRegistry};

/// Startup context handed to handler constructors. Built-in adapters need
/// nothing beyond their namespace constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlerContext;

pub trait ProductHandler: Send + Sync {
    fn namespace(&self) -> &str;

    /// Dimension correlating an instance id with the monitoring query.
    fn primary_dimension_key(&self) -> &str;

    /// Inspect or patch catalog metadata; `false` drops the metric.
    fn validate_and_augment_metadata(&self, _meta: &mut MetricMetadata) -> bool {
        true
    }

    /// Final allow/deny once the metric is built.
    fn is_metric_included(&self, _metric: &Metric) -> bool {
        true
    }

    /// One series per instance: the primary key maps to the instance id,
    /// every other declared dimension to the same-named instance attribute.
    fn build_series(&self, meta: &MetricMetadata, instances: &[Arc<Instance>]) -> Vec<Series> {
        let primary = self.primary_dimension_key();
        instances
            .iter()
            .map(|inst| {
                let mut q = BTreeMap::new();
                q.insert(primary.to_string(), inst.id.clone());
                for dim in meta.dimensions.iter().filter(|d| d.as_str() != primary) {
                    if let Some(v) = inst.attribute(dim) {
                        q.insert(dim.clone(), v.to_string());
                    }
                }
                Series::new(q, Arc::clone(inst))
            })
            .collect()
    }
}

/// Default handler: namespace identity plus the engine defaults.
#[derive(Debug, Clone)]
pub struct BaseHandler {
    namespace: String,
    primary_key: String,
}

impl BaseHandler {
    pub fn new(namespace: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            primary_key: primary_key.into(),
        }
    }
}

impl ProductHandler for BaseHandler {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn primary_dimension_key(&self) -> &str {
        &self.primary_key
    }
}
