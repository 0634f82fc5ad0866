use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::{TagMap, TagSources, UserId};

/// Provisioning job as seen by the tag layer at submission time.
///
/// `initiator` is the authenticated identity of the submitter, taken from the
/// session and never from the tag payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    /// Opaque job identifier, used for logging only.
    pub job_id: String,
    /// Authenticated submitter, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<UserId>,
    /// Tag layers to normalize into the job descriptor.
    #[serde(default)]
    pub sources: TagSources,
}

impl JobRequest {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            initiator: None,
            sources: TagSources::default(),
        }
    }

    /// Set the authenticated submitter.
    pub fn with_initiator(mut self, user: UserId) -> Self {
        self.initiator = Some(user);
        self
    }

    /// Set a single caller-supplied tag.
    ///
    /// This is a builder-style helper:
    ///
    /// ```rust
    /// use provtag_model::JobRequest;
    ///
    /// let job = JobRequest::new("build-42")
    ///     .with_caller_tag("region", "us")
    ///     .with_caller_tag("gpu", "a100");
    /// assert_eq!(job.sources.caller.get("gpu"), Some("a100"));
    /// ```
    pub fn with_caller_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.sources.caller.insert(key, value);
        self
    }

    /// Replace all tag layers.
    pub fn with_sources(mut self, sources: TagSources) -> Self {
        self.sources = sources;
        self
    }

    /// Caller-supplied tags only.
    pub fn caller_tags(&self) -> &TagMap {
        &self.sources.caller
    }
}
