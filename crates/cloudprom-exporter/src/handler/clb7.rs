//! Layer-7 load balancers (`QCE/LOADBALANCE`).

use std::sync::Arc;

use cloudprom_core::error::Result;
use cloudprom_core::util::contains_ignore_case;
use cloudprom_core::MetricMetadata;

use super::{BaseHandler, HandlerContext, HandlerRegistry, ProductHandler};
use crate::metric::Metric;

pub const NAMESPACE: &str = "QCE/LOADBALANCE";
pub const INSTANCE_KEY: &str = "vip";

/// Ratio statistics carry no meaning per vip.
pub const EXCLUDED_METRICS: &[&str] = &[
    "outpkgratio",
    "intrafficratio",
    "inpkgratio",
    "qpsratio",
    "activeconnratio",
    "newactiveconnratio",
    "outtrafficratio",
];

pub fn register(r: &mut HandlerRegistry) -> Result<()> {
    r.register(NAMESPACE, true, new_handler)
}

fn new_handler(_ctx: &HandlerContext) -> Result<Arc<dyn ProductHandler>> {
    Ok(Arc::new(Clb7Handler {
        base: BaseHandler::new(NAMESPACE, INSTANCE_KEY),
    }))
}

struct Clb7Handler {
    base: BaseHandler,
}

impl ProductHandler for Clb7Handler {
    fn namespace(&self) -> &str {
        self.base.namespace()
    }

    fn primary_dimension_key(&self) -> &str {
        self.base.primary_dimension_key()
    }

    fn validate_and_augment_metadata(&self, meta: &mut MetricMetadata) -> bool {
        meta.ensure_dimension(INSTANCE_KEY);
        true
    }

    fn is_metric_included(&self, metric: &Metric) -> bool {
        !contains_ignore_case(EXCLUDED_METRICS, &metric.meta().metric_name)
    }
}
