//! Direct-connect tunnels (`QCE/DCX`).

use std::sync::Arc;

use cloudprom_core::error::Result;
use cloudprom_core::util::contains_ignore_case;
use cloudprom_core::MetricMetadata;

use super::{BaseHandler, HandlerContext, HandlerRegistry, ProductHandler};

pub const NAMESPACE: &str = "QCE/DCX";
pub const INSTANCE_KEY: &str = "directConnectConnId";

/// Byte counters the API lists but never returns for tunnels.
pub const INVALID_METRICS: &[&str] = &["rxbytes", "txbytes"];

pub fn register(r: &mut HandlerRegistry) -> Result<()> {
    r.register(NAMESPACE, true, new_handler)
}

fn new_handler(_ctx: &HandlerContext) -> Result<Arc<dyn ProductHandler>> {
    Ok(Arc::new(DcxHandler {
        base: BaseHandler::new(NAMESPACE, INSTANCE_KEY),
    }))
}

struct DcxHandler {
    base: BaseHandler,
}

impl ProductHandler for DcxHandler {
    fn namespace(&self) -> &str {
        self.base.namespace()
    }

    fn primary_dimension_key(&self) -> &str {
        self.base.primary_dimension_key()
    }

    fn validate_and_augment_metadata(&self, meta: &mut MetricMetadata) -> bool {
        !contains_ignore_case(INVALID_METRICS, &meta.metric_name)
    }
}
