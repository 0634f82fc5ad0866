//! Provisioner router that ranks a snapshot of provisioner descriptors for a job.
//!
//! The router is filled once from the registry's view of live provisioners and then only read.
//! For each job it returns the eligible provisioners ordered by specificity; choosing among
//! equally specific ones and claiming the job is left to the queue.
use std::collections::BTreeSet;

use provtag_model::{ProvisionerRequest, TagMap, UserId};
use tracing::{debug, instrument, trace, warn};

use crate::{
    admission::{Admission, KIND_PROVISIONER},
    error::CoreError,
    matcher::{self, Candidate},
    metrics::{MetricsHandle, RouteOutcome},
    tags::CanonicalTags,
};

/// Single provisioner entry with its canonical descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerEntry {
    /// Provisioner name, unique within the router.
    pub name: String,
    /// Canonical tags advertised at registration.
    pub tags: CanonicalTags,
}

impl AsRef<TagMap> for ProvisionerEntry {
    fn as_ref(&self) -> &TagMap {
        self.tags.as_map()
    }
}

/// Snapshot of provisioners used to route jobs.
///
/// Provisioners are kept in registration order; that order is the tie-break
/// between equally specific candidates returned by [`ProvisionerRouter::route`].
#[derive(Debug, Default)]
pub struct ProvisionerRouter {
    entries: Vec<ProvisionerEntry>,
    names: BTreeSet<String>,
    admission: Admission,
}

impl ProvisionerRouter {
    /// Create an empty router with no-op metrics.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report registrations and routing decisions to the given backend.
    #[inline]
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.admission = self.admission.with_metrics(metrics);
        self
    }

    /// Register a provisioner, normalizing its tag layers with the identity it authenticated as.
    pub fn register<'a, I>(
        &mut self,
        name: impl Into<String>,
        user: Option<UserId>,
        sources: I,
    ) -> Result<&ProvisionerEntry, CoreError>
    where
        I: IntoIterator<Item = &'a TagMap>,
    {
        let tags = self.admission.admit_tags(KIND_PROVISIONER, user, sources);
        self.insert(name.into(), tags)
    }

    /// Register a provisioner from its registration request.
    ///
    /// Normalization goes through [`Admission`], so the resolution is logged and counted.
    pub fn register_request(
        &mut self,
        req: &ProvisionerRequest,
    ) -> Result<&ProvisionerEntry, CoreError> {
        let tags = self.admission.admit_provisioner(req);
        self.insert(req.name.clone(), tags)
    }

    /// Register a provisioner whose descriptor is already canonical (e.g. loaded from the registry).
    pub fn register_canonical(
        &mut self,
        name: impl Into<String>,
        tags: CanonicalTags,
    ) -> Result<&ProvisionerEntry, CoreError> {
        self.insert(name.into(), tags)
    }

    fn insert(&mut self, name: String, tags: CanonicalTags) -> Result<&ProvisionerEntry, CoreError> {
        if !self.names.insert(name.clone()) {
            warn!(provisioner = %name, "duplicate provisioner registration rejected");
            self.admission.metrics().record_registration_rejected("duplicate");
            return Err(CoreError::DuplicateProvisioner(name));
        }
        debug!(provisioner = %name, tags = %tags, "provisioner registered");

        let idx = self.entries.len();
        self.entries.push(ProvisionerEntry { name, tags });
        Ok(&self.entries[idx])
    }

    /// Number of registered provisioners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a provisioner by name.
    pub fn get(&self, name: &str) -> Option<&ProvisionerEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Iterate provisioners in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &ProvisionerEntry> {
        self.entries.iter()
    }

    /// Eligible provisioners for `job`, least specific first.
    ///
    /// An empty result means no provisioner can take the job right now; that is
    /// not an error and nothing is dispatched.
    #[instrument(level = "debug", skip(self, job), fields(scope = %job.scope()))]
    pub fn route(&self, job: &CanonicalTags) -> Vec<Candidate<&ProvisionerEntry>> {
        trace!(job = %job, pool = self.entries.len(), "routing job");

        let ranked = matcher::rank(job.as_map(), self.entries.iter());
        let outcome = if ranked.is_empty() {
            RouteOutcome::Unmatched
        } else {
            RouteOutcome::Matched
        };
        self.admission.metrics().record_route(outcome, ranked.len());

        match ranked.first() {
            Some(best) => debug!(
                candidates = ranked.len(),
                preferred = %best.worker.name,
                specificity = best.specificity,
                "job routed"
            ),
            None => debug!("no eligible provisioner"),
        }
        ranked
    }

    /// Preferred provisioner for `job`: the first entry of [`ProvisionerRouter::route`].
    pub fn pick(&self, job: &CanonicalTags) -> Option<&ProvisionerEntry> {
        self.route(job).into_iter().next().map(|c| c.worker)
    }
}
