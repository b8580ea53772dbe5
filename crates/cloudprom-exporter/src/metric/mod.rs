//! Metric container: descriptors, current series set, reload/export cycle.
//!
//! The series set is published copy-on-write through an `ArcSwap`: a reload
//! builds the complete map first and swaps the handle once, so a concurrent
//! export works on either the old or the new set, never a mixture.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwap;
use tokio::time::timeout;

use cloudprom_core::error::{CloudPromError, ErrorKind, Result};
use cloudprom_core::{
    aggregate, build_descriptors, split_by_batch, LabelResolver, MetricConfig, MetricDesc,
    MetricMetadata, SampleSet, Series,
};

use crate::repository::SampleRepository;

/// Current series of a metric, keyed by series id.
pub type SeriesSet = BTreeMap<String, Arc<Series>>;

/// One gauge sample ready for exposition.
#[derive(Debug, Clone)]
pub struct ExportedMetric {
    pub desc: Arc<MetricDesc>,
    pub label_values: Vec<String>,
    pub value: f64,
}

/// Result of one export cycle.
#[derive(Debug, Default)]
pub struct Collected {
    pub metrics: Vec<ExportedMetric>,
    /// Series without samples in the window, counted once per series
    /// regardless of how many stats it had.
    pub no_data: usize,
    /// Series skipped because a label could not be resolved.
    pub missing_value: usize,
}

impl Collected {
    fn dropped(&mut self, kind: ErrorKind) {
        match kind {
            ErrorKind::MissingValue => self.missing_value += 1,
            _ => self.no_data += 1,
        }
    }
}

pub struct Metric {
    id: String,
    meta: MetricMetadata,
    conf: MetricConfig,
    labels: LabelResolver,
    descs: Vec<Arc<MetricDesc>>,
    series: ArcSwap<SeriesSet>,
}

impl Metric {
    /// Build labels and descriptors. Any failure is fatal for this metric only.
    pub fn new(meta: MetricMetadata, conf: MetricConfig) -> Result<Self> {
        conf.validate()?;
        let labels =
            LabelResolver::new(&meta.dimensions, &conf.instance_label_names, &conf.const_labels)?;
        let descs = build_descriptors(&meta, &conf, &labels)?
            .into_iter()
            .map(Arc::new)
            .collect();

        Ok(Self {
            id: format!("{}.{}", meta.namespace, meta.metric_name),
            meta,
            conf,
            labels,
            descs,
            series: ArcSwap::from_pointee(SeriesSet::new()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn meta(&self) -> &MetricMetadata {
        &self.meta
    }
    pub fn labels(&self) -> &LabelResolver {
        &self.labels
    }
    pub fn descriptors(&self) -> &[Arc<MetricDesc>] {
        &self.descs
    }

    /// Snapshot of the current series set.
    pub fn series(&self) -> Arc<SeriesSet> {
        self.series.load_full()
    }

    /// Replace the series set wholesale. Later duplicates of an id win.
    pub fn reload_series(&self, series: Vec<Series>) {
        let next: SeriesSet = series
            .into_iter()
            .map(|s| (s.id.clone(), Arc::new(s)))
            .collect();
        self.series.store(Arc::new(next));
    }

    /// Query window `[now - samples*period, now]`.
    pub fn window(&self, now: i64) -> (i64, i64) {
        let span = i64::try_from(self.conf.window_seconds()).unwrap_or(i64::MAX);
        (now.saturating_sub(span), now)
    }

    pub async fn collect(
        &self,
        repo: &dyn SampleRepository,
        batch_size: usize,
        query_timeout: Duration,
    ) -> Result<Collected> {
        self.collect_at(repo, unix_now()?, batch_size, query_timeout).await
    }

    /// Run one export cycle with the window ending at `now`.
    ///
    /// A repository error or timeout on any batch aborts the whole cycle; no
    /// partial output is returned.
    pub async fn collect_at(
        &self,
        repo: &dyn SampleRepository,
        now: i64,
        batch_size: usize,
        query_timeout: Duration,
    ) -> Result<Collected> {
        let (start, end) = self.window(now);
        let snapshot = self.series();
        let all: Vec<Arc<Series>> = snapshot.values().cloned().collect();

        let mut responses: Vec<(Vec<Arc<Series>>, Vec<SampleSet>)> = Vec::new();
        for batch in split_by_batch(&all, batch_size)? {
            let sets = timeout(query_timeout, repo.list_samples(self, &batch, start, end))
                .await
                .map_err(|_| {
                    CloudPromError::Repository(format!(
                        "list samples timed out after {}ms (metric={})",
                        query_timeout.as_millis(),
                        self.id
                    ))
                })??;
            responses.push((batch, sets));
        }

        let mut out = Collected::default();
        for (batch, sets) in responses {
            let mut by_id: HashMap<String, SampleSet> = HashMap::with_capacity(sets.len());
            for set in sets {
                if !snapshot.contains_key(&set.series_id) {
                    tracing::debug!(metric=%self.id, series=%set.series_id, "ignoring samples for unknown series");
                    continue;
                }
                by_id.insert(set.series_id.clone(), set);
            }

            for series in batch {
                let Some(set) = by_id.get(&series.id) else {
                    tracing::debug!(metric=%self.id, series=%series.id, "series absent from response");
                    out.dropped(ErrorKind::NoData);
                    continue;
                };
                self.export_series(&series, set, end, &mut out);
            }
        }
        Ok(out)
    }

    fn export_series(&self, series: &Series, set: &SampleSet, window_end: i64, out: &mut Collected) {
        let values = match self.labels.values(&series.query_labels, &series.instance) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(metric=%self.id, series=%series.id, err=%e, "dropping series");
                out.dropped(e.kind());
                return;
            }
        };

        let mut dropped = None;
        for desc in &self.descs {
            match aggregate(desc.stat, set, window_end) {
                Ok(sample) => out.metrics.push(ExportedMetric {
                    desc: Arc::clone(desc),
                    label_values: values.clone(),
                    value: sample.value,
                }),
                Err(e) => {
                    tracing::debug!(metric=%self.id, series=%series.id, stat=%desc.stat, err=%e, "no sample");
                    dropped = Some(e.kind());
                }
            }
        }
        if let Some(kind) = dropped {
            out.dropped(kind);
        }
    }
}

fn unix_now() -> Result<i64> {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| CloudPromError::Internal(format!("system clock before epoch: {e}")))?;
    i64::try_from(d.as_secs()).map_err(|e| CloudPromError::Internal(e.to_string()))
}
