//! Per-namespace collectors and their polling tasks.

pub mod poller;
pub mod product;

pub use poller::spawn_pollers;
pub use product::{CollectSettings, ProductCollector};
