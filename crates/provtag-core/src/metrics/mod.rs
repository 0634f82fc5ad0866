//! Metrics collection abstraction for tag admission and routing.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are injected into
//! [`crate::admission::Admission`] and [`crate::router::ProvisionerRouter`].
//! The pure functions in [`crate::tags`] and [`crate::matcher`] never record anything.
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, RouteOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
