//! Cache of the latest successful export per metric, rendered as gauges.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use dashmap::DashMap;

use cloudprom_core::MetricDesc;

use crate::metric::ExportedMetric;

/// Escape a label value.
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf".into() } else { "-Inf".into() }
    } else {
        v.to_string()
    }
}

/// Latest exported samples keyed by metric id.
///
/// A failed cycle removes the metric's entry; nothing is carried forward.
#[derive(Default)]
pub struct ExportCache {
    by_metric: DashMap<String, Arc<Vec<ExportedMetric>>>,
}

impl ExportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, metric_id: &str, metrics: Vec<ExportedMetric>) {
        self.by_metric.insert(metric_id.to_string(), Arc::new(metrics));
    }

    pub fn remove(&self, metric_id: &str) {
        self.by_metric.remove(metric_id);
    }

    pub fn get(&self, metric_id: &str) -> Option<Arc<Vec<ExportedMetric>>> {
        self.by_metric.get(metric_id).map(|r| Arc::clone(r.value()))
    }

    pub fn len(&self) -> usize {
        self.by_metric.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_metric.is_empty()
    }

    /// Render every cached family as a gauge, families sorted by name.
    pub fn render(&self, out: &mut String) {
        let snapshots: Vec<Arc<Vec<ExportedMetric>>> =
            self.by_metric.iter().map(|r| Arc::clone(r.value())).collect();

        let mut families: BTreeMap<&str, (&MetricDesc, Vec<&ExportedMetric>)> = BTreeMap::new();
        for snap in &snapshots {
            for m in snap.iter() {
                families
                    .entry(m.desc.fq_name.as_str())
                    .or_insert_with(|| (m.desc.as_ref(), Vec::new()))
                    .1
                    .push(m);
            }
        }

        for (name, (desc, rows)) in families {
            let _ = writeln!(out, "# HELP {} {}", name, escape_help(&desc.help));
            let _ = writeln!(out, "# TYPE {} gauge", name);
            for m in rows {
                let labels = m
                    .desc
                    .label_names
                    .iter()
                    .zip(&m.label_values)
                    .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                    .collect::<Vec<_>>()
                    .join(",");
                let _ = writeln!(out, "{}{{{}}} {}", name, labels, format_value(m.value));
            }
        }
    }
}
