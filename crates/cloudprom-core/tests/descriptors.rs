//! Descriptor naming and help text golden tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;

use cloudprom_core::{build_descriptors, LabelResolver, MetricConfig, MetricMetadata, NameStyle, StatType};

fn clb_meta() -> MetricMetadata {
    MetricMetadata::new("QCE/LB_PUBLIC", "ClientConnum")
        .with_unit("count")
        .with_meaning("client connections")
        .with_dimension("vip")
        .with_dimension("vpcId")
        .with_period(60, "sum")
        .with_period(300, "max")
}

fn resolver(meta: &MetricMetadata, conf: &MetricConfig) -> LabelResolver {
    LabelResolver::new(&meta.dimensions, &conf.instance_label_names, &conf.const_labels).unwrap()
}

#[test]
fn one_descriptor_per_stat_with_last_renamed_to_native() {
    let meta = clb_meta();
    let mut conf = MetricConfig::new("qce", "clb");
    conf.stat_types = vec![StatType::Last, StatType::Max, StatType::Avg];

    let descs = build_descriptors(&meta, &conf, &resolver(&meta, &conf)).unwrap();
    let names: Vec<&str> = descs.iter().map(|d| d.fq_name.as_str()).collect();
    assert_eq!(
        names,
        ["qce_clb_client_connum_sum", "qce_clb_client_connum_max", "qce_clb_client_connum_avg"]
    );
    assert_eq!(descs[0].stat, StatType::Last);
    assert_eq!(
        descs[0].help,
        "Metric from QCE/LB_PUBLIC.ClientConnum unit=count stat=sum Desc=client connections"
    );
    for d in &descs {
        assert_eq!(d.label_names, ["vip", "vpc_id"]);
    }
}

#[test]
fn custom_name_and_lowercase_style() {
    let meta = clb_meta();
    let mut conf = MetricConfig::new("QCE", "CLB");
    conf.custom_metric_name = Some("ClientConn".into());
    conf.name_style = NameStyle::Lowercase;
    conf.stat_period_seconds = 300;

    let descs = build_descriptors(&meta, &conf, &resolver(&meta, &conf)).unwrap();
    assert_eq!(descs.len(), 1);
    assert_eq!(descs[0].fq_name, "qce_clb_clientconn_max");
}

#[test]
fn names_are_deterministic_lowercase_without_whitespace() {
    let meta = MetricMetadata::new("QCE/DCX", "Out Bandwidth").with_period(60, "Avg");
    let mut conf = MetricConfig::new("Tencent Cloud", "dcx");
    conf.stat_types = vec![StatType::Last, StatType::Min];

    let r = LabelResolver::new(&meta.dimensions, &[], &BTreeMap::new()).unwrap();
    let a = build_descriptors(&meta, &conf, &r).unwrap();
    let b = build_descriptors(&meta, &conf, &r).unwrap();
    assert_eq!(a, b);
    for d in &a {
        assert_eq!(d.fq_name, d.fq_name.to_lowercase());
        assert!(!d.fq_name.chars().any(char::is_whitespace), "{}", d.fq_name);
    }
    assert_eq!(a[0].fq_name, "tencent_cloud_dcx_out_bandwidth_avg");
}

#[test]
fn unknown_period_is_configuration_error() {
    let meta = clb_meta();
    let mut conf = MetricConfig::new("qce", "clb");
    conf.stat_period_seconds = 10;
    let err = build_descriptors(&meta, &conf, &resolver(&meta, &conf)).unwrap_err();
    assert_eq!(err.kind().as_str(), "CONFIGURATION");
}

#[test]
fn last_renamed_onto_requested_stat_collides() {
    let meta = MetricMetadata::new("QCE/DCX", "Delay").with_period(60, "avg");
    let mut conf = MetricConfig::new("qce", "dcx");
    conf.stat_types = vec![StatType::Avg, StatType::Last];
    let r = LabelResolver::new(&meta.dimensions, &[], &BTreeMap::new()).unwrap();
    let err = build_descriptors(&meta, &conf, &r).unwrap_err();
    assert_eq!(err.kind().as_str(), "CONFIGURATION");
}
