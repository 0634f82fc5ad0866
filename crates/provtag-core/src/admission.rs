//! Observed entry points for descriptor normalization.
//!
//! [`Admission`] wraps [`crate::tags`] with structured logging and metrics.
//! The canonical result is exactly what the pure functions return.
use std::fmt;

use provtag_model::{JobRequest, ProvisionerRequest, TagMap, UserId};
use tracing::{debug, instrument, warn};

use crate::{
    metrics::{MetricsHandle, noop_metrics},
    tags::{
        CanonicalTags, Resolution, normalize_job, normalize_provisioner, normalize_with_resolution,
    },
};

/// Descriptor kind label for jobs.
pub const KIND_JOB: &str = "job";
/// Descriptor kind label for provisioners.
pub const KIND_PROVISIONER: &str = "provisioner";

/// Computes job and provisioner descriptors and reports how they were reconciled.
#[derive(Clone)]
pub struct Admission {
    metrics: MetricsHandle,
}

impl Admission {
    /// Create an admission service with no-op metrics.
    pub fn new() -> Self {
        Self {
            metrics: noop_metrics(),
        }
    }

    /// Replace the metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }

    /// Canonical descriptor for a submitted job.
    #[instrument(level = "debug", skip(self, req), fields(job = %req.job_id))]
    pub fn admit_job(&self, req: &JobRequest) -> CanonicalTags {
        let (tags, resolution) = normalize_job(req);
        self.report(KIND_JOB, &tags, resolution);
        tags
    }

    /// Canonical descriptor advertised by a provisioner.
    #[instrument(level = "debug", skip(self, req), fields(provisioner = %req.name))]
    pub fn admit_provisioner(&self, req: &ProvisionerRequest) -> CanonicalTags {
        let (tags, resolution) = normalize_provisioner(req);
        self.report(KIND_PROVISIONER, &tags, resolution);
        tags
    }

    /// Canonical descriptor for raw tag layers, reported under `kind`.
    #[instrument(level = "debug", skip(self, sources))]
    pub fn admit_tags<'a, I>(&self, kind: &str, user: Option<UserId>, sources: I) -> CanonicalTags
    where
        I: IntoIterator<Item = &'a TagMap>,
    {
        let (tags, resolution) = normalize_with_resolution(user, sources);
        self.report(kind, &tags, resolution);
        tags
    }

    fn report(&self, kind: &str, tags: &CanonicalTags, resolution: Resolution) {
        if resolution.is_fallback() {
            warn!(kind, resolution = %resolution, "requested scope not honoured, using organization");
        } else if resolution.discarded_owner() {
            warn!(kind, resolution = %resolution, "supplied owner tag ignored");
        }
        debug!(kind, scope = %tags.scope(), tags = %tags, "descriptor normalized");
        self.metrics.record_normalized(kind, tags.scope(), resolution);
    }
}

impl Default for Admission {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admission")
            .field("metrics", &"<handle>")
            .finish()
    }
}
