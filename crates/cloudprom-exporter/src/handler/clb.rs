//! Public load balancers (`QCE/LB_PUBLIC`).

use std::sync::Arc;

use cloudprom_core::error::Result;
use cloudprom_core::MetricMetadata;

use super::{BaseHandler, HandlerContext, HandlerRegistry, ProductHandler};

pub const NAMESPACE: &str = "QCE/LB_PUBLIC";
pub const INSTANCE_KEY: &str = "vip";

pub fn register(r: &mut HandlerRegistry) -> Result<()> {
    r.register(NAMESPACE, true, new_handler)
}

fn new_handler(_ctx: &HandlerContext) -> Result<Arc<dyn ProductHandler>> {
    Ok(Arc::new(ClbHandler {
        base: BaseHandler::new(NAMESPACE, INSTANCE_KEY),
    }))
}

struct ClbHandler {
    base: BaseHandler,
}

impl ProductHandler for ClbHandler {
    fn namespace(&self) -> &str {
        self.base.namespace()
    }

    fn primary_dimension_key(&self) -> &str {
        self.base.primary_dimension_key()
    }

    // the catalog omits `vip` although every query is keyed by it
    fn validate_and_augment_metadata(&self, meta: &mut MetricMetadata) -> bool {
        meta.ensure_dimension(INSTANCE_KEY);
        true
    }
}
