//! Namespace -> handler constructor registry.
//!
//! Built once by the process entry point via [`HandlerRegistry::builtin`],
//! then shared read-only.

use std::collections::HashMap;
use std::sync::Arc;

use cloudprom_core::error::{CloudPromError, Result};

use super::{clb, clb7, dcx, HandlerContext, ProductHandler};

/// Constructor invoked once per namespace at startup.
pub type HandlerCtor = fn(&HandlerContext) -> Result<Arc<dyn ProductHandler>>;

struct Registration {
    enabled_by_default: bool,
    ctor: HandlerCtor,
}

#[derive(Default)]
pub struct HandlerRegistry {
    entries: HashMap<String, Registration>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in product adapter.
    pub fn builtin() -> Result<Self> {
        let mut r = Self::new();
        clb::register(&mut r)?;
        clb7::register(&mut r)?;
        dcx::register(&mut r)?;
        Ok(r)
    }

    pub fn register(
        &mut self,
        namespace: &str,
        enabled_by_default: bool,
        ctor: HandlerCtor,
    ) -> Result<()> {
        if self.entries.contains_key(namespace) {
            return Err(CloudPromError::Duplicate(namespace.to_string()));
        }
        self.entries.insert(
            namespace.to_string(),
            Registration {
                enabled_by_default,
                ctor,
            },
        );
        Ok(())
    }

    pub fn enabled_by_default(&self, namespace: &str) -> Result<bool> {
        self.entries
            .get(namespace)
            .map(|r| r.enabled_by_default)
            .ok_or_else(|| CloudPromError::NotFound(namespace.to_string()))
    }

    pub fn construct(&self, namespace: &str, ctx: &HandlerContext) -> Result<Arc<dyn ProductHandler>> {
        let reg = self
            .entries
            .get(namespace)
            .ok_or_else(|| CloudPromError::NotFound(namespace.to_string()))?;
        let handler = (reg.ctor)(ctx)?;
        if handler.namespace() != namespace {
            return Err(CloudPromError::Internal(format!(
                "handler registered for {namespace} reports namespace {}",
                handler.namespace()
            )));
        }
        Ok(handler)
    }

    /// Registered namespaces, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        v.sort_unstable();
        v
    }
}
