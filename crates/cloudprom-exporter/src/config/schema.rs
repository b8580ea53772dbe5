use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use serde::Deserialize;

use cloudprom_core::error::{CloudPromError, Result};
use cloudprom_core::util::{contains_ignore_case, sanitize_metric_name};
use cloudprom_core::{MetricConfig, NameStyle, StatType};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    pub catalog: CatalogSection,

    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CloudPromError::Configuration(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        if self.products.is_empty() {
            return Err(CloudPromError::Configuration("products must not be empty".into()));
        }

        self.exporter.validate()?;

        let mut seen = HashSet::new();
        let mut names = HashSet::new();
        for p in &self.products {
            if !seen.insert(p.namespace.as_str()) {
                return Err(CloudPromError::Configuration(format!(
                    "product {} configured twice",
                    p.namespace
                )));
            }
            // product_name is part of every exported metric name
            if !names.insert(sanitize_metric_name(&p.product_name)) {
                return Err(CloudPromError::Configuration(format!(
                    "product_name {} used by more than one product (namespace {})",
                    p.product_name, p.namespace
                )));
            }
            p.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_namespace_prefix")]
    pub namespace_prefix: String,

    /// Series per repository call. Signed so a negative value is reported
    /// instead of failing to parse.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_scrape_interval_secs")]
    pub scrape_interval_secs: u64,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            namespace_prefix: default_namespace_prefix(),
            batch_size: default_batch_size(),
            query_timeout_ms: default_query_timeout_ms(),
            scrape_interval_secs: default_scrape_interval_secs(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size <= 0 {
            return Err(CloudPromError::InvalidArgument(
                "exporter.batch_size must be greater than zero".into(),
            ));
        }
        if self.query_timeout_ms == 0 {
            return Err(CloudPromError::Configuration(
                "exporter.query_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.scrape_interval_secs == 0 {
            return Err(CloudPromError::Configuration(
                "exporter.scrape_interval_secs must be greater than zero".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(CloudPromError::Configuration(
                "exporter.max_concurrency must be greater than zero".into(),
            ));
        }
        if self.namespace_prefix.trim().is_empty() {
            return Err(CloudPromError::Configuration(
                "exporter.namespace_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Validated batch size.
    pub fn batch_size(&self) -> usize {
        usize::try_from(self.batch_size).unwrap_or(0)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn scrape_interval(&self) -> Duration {
        Duration::from_secs(self.scrape_interval_secs)
    }
}

fn default_listen() -> String {
    "0.0.0.0:9123".into()
}
fn default_namespace_prefix() -> String {
    "qce".into()
}
fn default_batch_size() -> i64 {
    50
}
fn default_query_timeout_ms() -> u64 {
    5000
}
fn default_scrape_interval_secs() -> u64 {
    60
}
fn default_max_concurrency() -> usize {
    8
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSection {
    pub replay_file: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductConfig {
    pub namespace: String,
    pub product_name: String,

    /// Overrides the registry default when set.
    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub only_include_metrics: Vec<String>,
    #[serde(default)]
    pub exclude_metrics: Vec<String>,

    #[serde(default = "default_stat_types")]
    pub stat_types: Vec<StatType>,
    #[serde(default = "default_stat_period_seconds")]
    pub stat_period_seconds: u64,
    #[serde(default = "default_stat_num_samples")]
    pub stat_num_samples: u64,

    #[serde(default)]
    pub metric_name_type: NameStyle,
    #[serde(default)]
    pub const_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub instance_labels: Vec<String>,

    #[serde(default)]
    pub metrics: Vec<MetricOverride>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricOverride {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub stat_types: Option<Vec<StatType>>,
    #[serde(default)]
    pub stat_period_seconds: Option<u64>,
    #[serde(default)]
    pub stat_num_samples: Option<u64>,
}

fn default_stat_types() -> Vec<StatType> {
    vec![StatType::Last]
}
fn default_stat_period_seconds() -> u64 {
    60
}
fn default_stat_num_samples() -> u64 {
    1
}

impl ProductConfig {
    pub fn validate(&self) -> Result<()> {
        if self.product_name.trim().is_empty() {
            return Err(CloudPromError::Configuration(format!(
                "product {} needs a product_name",
                self.namespace
            )));
        }
        // product defaults and every override go through the same checks
        self.metric_config("qce", "").validate()?;
        for o in &self.metrics {
            self.metric_config("qce", &o.name).validate().map_err(|e| {
                CloudPromError::Configuration(format!("{} metric {}: {e}", self.namespace, o.name))
            })?;
        }
        Ok(())
    }

    /// Include/exclude lists, case-insensitive. An empty include list selects all.
    pub fn is_metric_selected(&self, metric_name: &str) -> bool {
        if !self.only_include_metrics.is_empty()
            && !contains_ignore_case(&self.only_include_metrics, metric_name)
        {
            return false;
        }
        !contains_ignore_case(&self.exclude_metrics, metric_name)
    }

    /// Product defaults with the matching per-metric override applied.
    pub fn metric_config(&self, namespace_prefix: &str, metric_name: &str) -> MetricConfig {
        let mut conf = MetricConfig::new(namespace_prefix, self.product_name.as_str());
        conf.stat_types = self.stat_types.clone();
        conf.stat_period_seconds = self.stat_period_seconds;
        conf.stat_num_samples = self.stat_num_samples;
        conf.name_style = self.metric_name_type;
        conf.const_labels = self.const_labels.clone();
        conf.instance_label_names = self.instance_labels.clone();

        if let Some(o) = self
            .metrics
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(metric_name))
        {
            conf.custom_metric_name = o.display_name.clone();
            if let Some(st) = &o.stat_types {
                conf.stat_types = st.clone();
            }
            if let Some(p) = o.stat_period_seconds {
                conf.stat_period_seconds = p;
            }
            if let Some(n) = o.stat_num_samples {
                conf.stat_num_samples = n;
            }
        }
        conf
    }
}
