//! cloudprom exporter library entry.
//!
//! Wires the handler registry, product collectors, repository contracts and
//! exposition cache into a polling exporter. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod collector;
pub mod config;
pub mod handler;
pub mod metric;
pub mod obs;
pub mod ops;
pub mod repository;
pub mod router;
