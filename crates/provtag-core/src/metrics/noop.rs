use provtag_model::Scope;

use crate::metrics::backend::{MetricsBackend, RouteOutcome};
use crate::tags::Resolution;

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_normalized(&self, _: &str, _: Scope, _: Resolution) {}

    #[inline(always)]
    fn record_route(&self, _: RouteOutcome, _: usize) {}

    #[inline(always)]
    fn record_registration_rejected(&self, _: &str) {}
}
