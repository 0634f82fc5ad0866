use std::sync::Arc;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, proto::MetricFamily};

use provtag_core::{MetricsBackend, RouteOutcome, tags::Resolution};
use provtag_model::Scope;

/// Prometheus metrics backend for provtag.
///
/// ## Metrics
/// - `provtag_descriptors_normalized_total{kind, scope, resolution}` - Counter
/// - `provtag_routes_total{outcome}` - Counter
/// - `provtag_route_candidates{outcome}` - Histogram of eligible set sizes
/// - `provtag_registrations_rejected_total{reason}` - Counter
///
/// ## Label cardinality
/// All labels are bounded:
/// - `kind`: "job", "provisioner"
/// - `scope`: "organization", "user"
/// - `resolution`: six reconciliation branches
/// - `outcome`: "matched", "unmatched"
/// - `reason`: "duplicate"
#[derive(Clone)]
pub struct PrometheusMetrics {
    normalized: CounterVec,
    routes: CounterVec,
    route_candidates: HistogramVec,
    rejected: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a new prometheus metrics backend with custom registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let normalized = CounterVec::new(
            Opts::new(
                "descriptors_normalized_total",
                "Total number of normalized tag descriptors",
            )
            .namespace("provtag"),
            &["kind", "scope", "resolution"],
        )?;
        registry.register(Box::new(normalized.clone()))?;

        let routes = CounterVec::new(
            Opts::new("routes_total", "Total number of routing decisions").namespace("provtag"),
            &["outcome"],
        )?;
        registry.register(Box::new(routes.clone()))?;

        let route_candidates = HistogramVec::new(
            HistogramOpts::new(
                "route_candidates",
                "Number of eligible provisioners per routing decision",
            )
            .namespace("provtag")
            .buckets(vec![0.0, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(route_candidates.clone()))?;

        let rejected = CounterVec::new(
            Opts::new(
                "registrations_rejected_total",
                "Total number of rejected provisioner registrations",
            )
            .namespace("provtag"),
            &["reason"],
        )?;
        registry.register(Box::new(rejected.clone()))?;

        Ok(Self {
            normalized,
            routes,
            route_candidates,
            rejected,
            registry,
        })
    }

    /// Create a new prometheus metrics backend with default registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Get reference to underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_normalized(&self, kind: &str, scope: Scope, resolution: Resolution) {
        self.normalized
            .with_label_values(&[kind, scope.as_str(), resolution.as_label()])
            .inc();
    }

    fn record_route(&self, outcome: RouteOutcome, candidates: usize) {
        let label = outcome.as_label();
        self.routes.with_label_values(&[label]).inc();
        self.route_candidates
            .with_label_values(&[label])
            .observe(candidates as f64);
    }

    fn record_registration_rejected(&self, reason: &str) {
        self.rejected.with_label_values(&[reason]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{Encoder, TextEncoder};

    fn render(metrics: &PrometheusMetrics) -> String {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&metrics.gather(), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn records_normalizations_by_resolution() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_normalized("job", Scope::User, Resolution::OwnerOverridden);
        metrics.record_normalized("job", Scope::User, Resolution::OwnerOverridden);
        metrics.record_normalized("provisioner", Scope::Organization, Resolution::Organization);

        let c = metrics
            .normalized
            .with_label_values(&["job", "user", "owner_overridden"])
            .get();
        assert_eq!(c, 2.0);

        let text = render(&metrics);
        assert!(text.contains("provtag_descriptors_normalized_total"));
        assert!(text.contains(r#"resolution="organization""#));
    }

    #[test]
    fn records_routes_and_candidate_counts() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_route(RouteOutcome::Matched, 3);
        metrics.record_route(RouteOutcome::Unmatched, 0);

        assert_eq!(metrics.routes.with_label_values(&["matched"]).get(), 1.0);
        assert_eq!(metrics.routes.with_label_values(&["unmatched"]).get(), 1.0);

        let h = metrics.route_candidates.with_label_values(&["matched"]);
        assert_eq!(h.get_sample_count(), 1);
        assert_eq!(h.get_sample_sum(), 3.0);
    }

    #[test]
    fn records_rejections() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_registration_rejected("duplicate");
        assert_eq!(metrics.rejected.with_label_values(&["duplicate"]).get(), 1.0);
    }

    #[test]
    fn duplicate_registration_on_shared_registry_fails() {
        let registry = Arc::new(Registry::new());
        let _first = PrometheusMetrics::new_with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }
}
