//! Label resolution: declared label names and per-series values.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::{CloudPromError, Result};
use crate::series::{series_id, Instance};
use crate::util::{sanitize_label_name, to_snake_lower};

#[derive(Debug, Clone)]
enum LabelSource {
    /// Taken from the series' query labels; required.
    Dimension(String),
    /// Taken from the instance attributes; empty when absent.
    Instance(String),
    Const(String),
}

/// Declared label schema of a metric.
///
/// Order: sorted dimensions, instance labels (configured order), constant
/// labels (sorted by name).
#[derive(Debug, Clone)]
pub struct LabelResolver {
    names: Vec<String>,
    sources: Vec<LabelSource>,
}

impl LabelResolver {
    pub fn new(
        dimensions: &BTreeSet<String>,
        instance_label_names: &[String],
        const_labels: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut sources = Vec::with_capacity(
            dimensions.len() + instance_label_names.len() + const_labels.len(),
        );
        let mut raw_names = Vec::with_capacity(sources.capacity());

        for d in dimensions {
            raw_names.push(d.clone());
            sources.push(LabelSource::Dimension(d.clone()));
        }
        for n in instance_label_names {
            raw_names.push(n.clone());
            sources.push(LabelSource::Instance(n.clone()));
        }
        for (k, v) in const_labels {
            raw_names.push(k.clone());
            sources.push(LabelSource::Const(v.clone()));
        }

        let names: Vec<String> = raw_names
            .iter()
            .map(|n| sanitize_label_name(&to_snake_lower(n)))
            .collect();
        let mut seen = HashSet::with_capacity(names.len());
        for (raw, n) in raw_names.iter().zip(&names) {
            if n.is_empty() || n.starts_with("__") {
                return Err(CloudPromError::Configuration(format!(
                    "invalid label name: {raw:?} -> {n:?}"
                )));
            }
            if !seen.insert(n.as_str()) {
                return Err(CloudPromError::Configuration(format!(
                    "label name collision: {raw} -> {n}"
                )));
            }
        }

        Ok(Self { names, sources })
    }

    /// Normalized label names, in value order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values aligned to [`names`](Self::names).
    pub fn values(
        &self,
        query_labels: &BTreeMap<String, String>,
        instance: &Instance,
    ) -> Result<Vec<String>> {
        self.sources
            .iter()
            .map(|src| match src {
                LabelSource::Dimension(d) => query_labels.get(d).cloned().ok_or_else(|| {
                    CloudPromError::MissingValue {
                        label: d.clone(),
                        series: series_id(query_labels),
                    }
                }),
                LabelSource::Instance(n) => {
                    Ok(instance.attribute(n).unwrap_or_default().to_string())
                }
                LabelSource::Const(v) => Ok(v.clone()),
            })
            .collect()
    }
}
