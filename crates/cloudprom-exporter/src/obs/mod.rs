//! Exposition of polled metrics plus the exporter's own counters.
//!
//! Both are rendered in the Prometheus text format by the `/metrics` handler.

pub mod exposition;
pub mod metrics;

pub use exposition::ExportCache;
pub use metrics::ExporterMetrics;
