//! Exposition descriptors: fully-qualified name, help text, label schema.

use crate::conf::{MetricConfig, NameStyle};
use crate::error::{CloudPromError, Result};
use crate::labels::LabelResolver;
use crate::meta::MetricMetadata;
use crate::stat::StatType;
use crate::util::{sanitize_metric_name, to_snake_lower};

/// Definition of one exported gauge family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDesc {
    pub fq_name: String,
    pub help: String,
    pub label_names: Vec<String>,
    /// The requested statistic this family carries.
    pub stat: StatType,
}

/// One descriptor per requested statistic, in request order.
///
/// Fails with `Configuration` if the metadata declares no native statistic
/// for the configured period, or if two statistics end up with the same name
/// (`last` renamed to a native `avg` next to a requested `avg`).
pub fn build_descriptors(
    meta: &MetricMetadata,
    conf: &MetricConfig,
    labels: &LabelResolver,
) -> Result<Vec<MetricDesc>> {
    let native = meta.stat_type(conf.stat_period_seconds)?;
    let help = format!(
        "Metric from {}.{} unit={} stat={} Desc={}",
        meta.namespace, meta.metric_name, meta.unit, native, meta.meaning
    );

    let display = conf
        .custom_metric_name
        .as_deref()
        .unwrap_or(meta.metric_name.as_str());
    let display = match conf.name_style {
        NameStyle::Underscore => to_snake_lower(display),
        NameStyle::Lowercase => display.to_lowercase(),
    };

    let descs: Vec<MetricDesc> = conf
        .stat_types
        .iter()
        .map(|&stat| {
            // only `last` reports under the native statistic's name
            let suffix = match stat {
                StatType::Last => native.to_lowercase(),
                other => other.as_str().to_string(),
            };
            let fq_name = sanitize_metric_name(&format!(
                "{}_{}_{}_{}",
                conf.namespace_prefix, conf.product_name, display, suffix
            ));
            MetricDesc {
                fq_name,
                help: help.clone(),
                label_names: labels.names().to_vec(),
                stat,
            }
        })
        .collect();

    for (i, d) in descs.iter().enumerate() {
        if descs[..i].iter().any(|o| o.fq_name == d.fq_name) {
            return Err(CloudPromError::Configuration(format!(
                "{}.{}: statistics {} collide on name {}",
                meta.namespace, meta.metric_name, d.stat, d.fq_name
            )));
        }
    }
    Ok(descs)
}
