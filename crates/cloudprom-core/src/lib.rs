//! cloudprom core: the metric model and the pure parts of the pipeline.
//!
//! This crate holds metadata/config types, label resolution, descriptor
//! naming, series batching and statistic aggregation. It carries no runtime
//! or transport dependencies so every piece here stays a plain function over
//! its inputs and can be shared by concurrent pollers without locking.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `CloudPromError`/`Result`.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod batch;
pub mod conf;
pub mod desc;
pub mod error;
pub mod labels;
pub mod meta;
pub mod series;
pub mod stat;
pub mod util;

/// Shared result type.
pub use error::{CloudPromError, ErrorKind, Result};

pub use batch::split_by_batch;
pub use conf::{MetricConfig, NameStyle};
pub use desc::{build_descriptors, MetricDesc};
pub use labels::LabelResolver;
pub use meta::{MetricMetadata, PeriodStat};
pub use series::{Instance, Sample, SampleSet, Series};
pub use stat::{aggregate, StatType};
