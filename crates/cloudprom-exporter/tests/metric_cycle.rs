//! Reload/export cycle of a single metric.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cloudprom_core::{Instance, MetricConfig, MetricMetadata, Series, StatType};
use cloudprom_exporter::metric::Metric;

use common::{FailingRepo, SlowRepo, StaticRepo};

const T0: i64 = 1_700_000_000;
const TIMEOUT: Duration = Duration::from_secs(5);

fn clb_metric(stats: Vec<StatType>) -> Metric {
    let meta = MetricMetadata::new("QCE/LB_PUBLIC", "ClientConnum")
        .with_unit("count")
        .with_dimension("vip")
        .with_period(60, "sum");
    let mut conf = MetricConfig::new("qce", "clb");
    conf.stat_types = stats;
    conf.stat_period_seconds = 60;
    conf.stat_num_samples = 10;
    conf.instance_label_names = vec!["LoadBalancerName".into()];
    Metric::new(meta, conf).unwrap()
}

fn series(vip: &str, name: &str) -> Series {
    let mut q = BTreeMap::new();
    q.insert("vip".to_string(), vip.to_string());
    Series::new(q, Arc::new(Instance::new(vip).with_attribute("LoadBalancerName", name)))
}

#[test]
fn id_and_descriptors() {
    let m = clb_metric(vec![StatType::Last, StatType::Avg]);
    assert_eq!(m.id(), "QCE/LB_PUBLIC.ClientConnum");
    assert_eq!(m.descriptors().len(), 2);
    for d in m.descriptors() {
        assert_eq!(d.label_names, m.labels().names());
    }
    assert_eq!(m.window(T0 + 600), (T0, T0 + 600));
}

#[tokio::test]
async fn last_and_avg_for_two_series() {
    let m = clb_metric(vec![StatType::Last, StatType::Avg]);
    m.reload_series(vec![series("10.0.0.1", "web"), series("10.0.0.2", "api")]);

    let repo = StaticRepo::default()
        .with("vip=10.0.0.1", &[(T0, 1.0), (T0 + 600, 4.0), (T0 + 300, 7.0)])
        .with("vip=10.0.0.2", &[(T0 + 300, 2.0), (T0, 2.0), (T0 + 600, 5.0)]);

    let c = m.collect_at(&repo, T0 + 600, 50, TIMEOUT).await.unwrap();
    assert_eq!(c.metrics.len(), 4);
    assert_eq!(c.no_data, 0);

    let find = |vip: &str, stat: StatType| {
        let rows: Vec<_> = c
            .metrics
            .iter()
            .filter(|e| e.label_values[0] == vip && e.desc.stat == stat)
            .collect();
        assert_eq!(rows.len(), 1, "vip={vip} stat={stat}");
        rows[0].clone()
    };

    let last1 = find("10.0.0.1", StatType::Last);
    let avg1 = find("10.0.0.1", StatType::Avg);
    assert_eq!(last1.value, 4.0);
    assert!((avg1.value - 4.0).abs() < 1e-9);
    assert_eq!(last1.label_values, ["10.0.0.1", "web"]);
    assert_eq!(avg1.label_values, last1.label_values);
    assert_eq!(last1.desc.fq_name, "qce_clb_client_connum_sum");
    assert_eq!(avg1.desc.fq_name, "qce_clb_client_connum_avg");

    let last2 = find("10.0.0.2", StatType::Last);
    let avg2 = find("10.0.0.2", StatType::Avg);
    assert_eq!(last2.value, 5.0);
    assert!((avg2.value - 3.0).abs() < 1e-9);
    assert_eq!(last2.label_values, ["10.0.0.2", "api"]);
}

#[tokio::test]
async fn absent_series_is_skipped_and_cycle_succeeds() {
    let m = clb_metric(vec![StatType::Max]);
    m.reload_series(vec![series("10.0.0.1", "web"), series("10.0.0.2", "api")]);
    let repo = StaticRepo::default().with("vip=10.0.0.2", &[(T0 + 60, 9.0)]);

    let c = m.collect_at(&repo, T0 + 600, 50, TIMEOUT).await.unwrap();
    assert_eq!(c.metrics.len(), 1);
    assert_eq!(c.metrics[0].label_values[0], "10.0.0.2");
    assert_eq!(c.no_data, 1);
}

#[tokio::test]
async fn empty_window_is_no_data_not_zero() {
    let m = clb_metric(vec![StatType::Last]);
    m.reload_series(vec![series("10.0.0.1", "web")]);
    // sample older than the window
    let repo = StaticRepo::default().with("vip=10.0.0.1", &[(T0 - 1, 1.0)]);

    let c = m.collect_at(&repo, T0 + 600, 50, TIMEOUT).await.unwrap();
    assert!(c.metrics.is_empty());
    assert_eq!(c.no_data, 1);
}

#[tokio::test]
async fn no_data_counts_each_series_once() {
    let m = clb_metric(vec![StatType::Last, StatType::Max, StatType::Avg]);
    m.reload_series(vec![series("10.0.0.1", "web"), series("10.0.0.2", "api")]);
    // one series answered with an empty window, the other not at all
    let repo = StaticRepo::default().with("vip=10.0.0.1", &[(T0 - 1, 1.0)]);

    let c = m.collect_at(&repo, T0 + 600, 50, TIMEOUT).await.unwrap();
    assert!(c.metrics.is_empty());
    assert_eq!(c.no_data, 2);
}

#[tokio::test]
async fn missing_dimension_drops_only_that_series() {
    let meta = MetricMetadata::new("QCE/LB_PUBLIC", "ClientConnum")
        .with_dimension("vip")
        .with_dimension("port")
        .with_period(60, "sum");
    let m = Metric::new(meta, MetricConfig::new("qce", "clb")).unwrap();

    let mut with_port = BTreeMap::new();
    with_port.insert("vip".to_string(), "10.0.0.1".to_string());
    with_port.insert("port".to_string(), "443".to_string());
    let good = Series::new(with_port, Arc::new(Instance::new("10.0.0.1")));
    let bad = series("10.0.0.2", "api");
    let good_id = good.id.clone();
    m.reload_series(vec![good, bad]);

    let repo = StaticRepo::default()
        .with(&good_id, &[(T0, 1.0)])
        .with("vip=10.0.0.2", &[(T0, 2.0)]);
    let c = m.collect_at(&repo, T0 + 60, 50, TIMEOUT).await.unwrap();
    assert_eq!(c.metrics.len(), 1);
    assert_eq!(c.missing_value, 1);
    assert_eq!(c.metrics[0].label_values, ["443", "10.0.0.1"]);
}

#[tokio::test]
async fn batches_respect_batch_size() {
    let m = clb_metric(vec![StatType::Last]);
    m.reload_series((0..7).map(|i| series(&format!("10.0.0.{i}"), "lb")).collect());
    let repo = StaticRepo::default();

    m.collect_at(&repo, T0, 3, TIMEOUT).await.unwrap();
    assert_eq!(repo.calls.load(Ordering::SeqCst), 3);
    assert_eq!(*repo.batch_sizes.lock().unwrap(), [3, 3, 1]);

    let err = m.collect_at(&repo, T0, 0, TIMEOUT).await.unwrap_err();
    assert_eq!(err.kind().as_str(), "INVALID_ARGUMENT");
}

#[tokio::test]
async fn repository_failure_on_any_batch_aborts_cycle() {
    let m = clb_metric(vec![StatType::Last]);
    m.reload_series((0..5).map(|i| series(&format!("10.0.0.{i}"), "lb")).collect());
    let repo = FailingRepo {
        fail_on: 1,
        calls: AtomicUsize::new(0),
    };

    let err = m.collect_at(&repo, T0, 2, TIMEOUT).await.unwrap_err();
    assert_eq!(err.kind().as_str(), "REPOSITORY");
}

#[tokio::test]
async fn timeout_is_a_repository_error() {
    let m = clb_metric(vec![StatType::Last]);
    m.reload_series(vec![series("10.0.0.1", "web")]);
    let repo = SlowRepo(Duration::from_millis(500));

    let err = m
        .collect_at(&repo, T0, 10, Duration::from_millis(20))
        .await
        .unwrap_err();
    assert_eq!(err.kind().as_str(), "REPOSITORY");
}

#[test]
fn reload_is_atomic_under_concurrent_readers() {
    let m = Arc::new(clb_metric(vec![StatType::Last]));
    let set = |prefix: &str| -> Vec<Series> {
        (0..64).map(|i| series(&format!("{prefix}-{i}"), "lb")).collect()
    };
    m.reload_series(set("a"));

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let m = Arc::clone(&m);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let snap = m.series();
                    assert_eq!(snap.len(), 64);
                    let first = snap.keys().next().unwrap().as_bytes()[4];
                    assert!(snap.keys().all(|k| k.as_bytes()[4] == first), "mixed snapshot");
                }
            })
        })
        .collect();

    for i in 0..500 {
        m.reload_series(set(if i % 2 == 0 { "b" } else { "a" }));
    }
    stop.store(true, Ordering::Relaxed);
    for r in readers {
        r.join().unwrap();
    }
}
