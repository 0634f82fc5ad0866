use std::sync::Arc;

use provtag_model::Scope;

use crate::tags::Resolution;

/// Outcome of routing one job against a provisioner snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// At least one provisioner is eligible.
    Matched,
    /// No provisioner is eligible; the job stays with the queue.
    Unmatched,
}

impl RouteOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            RouteOutcome::Matched => "matched",
            RouteOutcome::Unmatched => "unmatched",
        }
    }
}

/// Backend metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record one normalized descriptor.
    ///
    /// # Arguments
    /// - `kind`: `"job"` or `"provisioner"`
    /// - `scope`: Scope of the canonical result
    /// - `resolution`: Reconciliation branch that produced it
    fn record_normalized(&self, kind: &str, scope: Scope, resolution: Resolution);
    /// Record one routing decision.
    ///
    /// # Arguments
    /// - `outcome`: Whether any provisioner was eligible
    /// - `candidates`: Size of the eligible set
    fn record_route(&self, outcome: RouteOutcome, candidates: usize);
    /// Record a rejected provisioner registration.
    ///
    /// # Arguments
    /// - `reason`: Error category (e.g. `"duplicate"`)
    fn record_registration_rejected(&self, reason: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
