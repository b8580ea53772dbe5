//! Top-level facade crate for cloudprom.
//!
//! Re-exports the core model and the exporter library so users can depend on a single crate.

pub mod core {
    pub use cloudprom_core::*;
}

pub mod exporter {
    pub use cloudprom_exporter::*;
}
