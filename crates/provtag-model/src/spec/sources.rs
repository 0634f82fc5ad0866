use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::TagMap;

/// Layered tag inputs assembled at job submission.
///
/// Layers are applied in order of increasing precedence:
/// - `template`: defaults declared by the template version;
/// - `job`: overrides attached to the job itself;
/// - `caller`: tags supplied by the submitting user.
///
/// A later layer only wins for keys where it carries a non-empty value.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct TagSources {
    #[serde(skip_serializing_if = "TagMap::is_empty")]
    pub template: TagMap,
    #[serde(skip_serializing_if = "TagMap::is_empty")]
    pub job: TagMap,
    #[serde(skip_serializing_if = "TagMap::is_empty")]
    pub caller: TagMap,
}

impl TagSources {
    /// Create sources with every layer empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, tags: TagMap) -> Self {
        self.template = tags;
        self
    }

    pub fn with_job(mut self, tags: TagMap) -> Self {
        self.job = tags;
        self
    }

    pub fn with_caller(mut self, tags: TagMap) -> Self {
        self.caller = tags;
        self
    }

    /// Iterate the layers from lowest to highest precedence.
    pub fn layers(&self) -> impl Iterator<Item = &TagMap> {
        [&self.template, &self.job, &self.caller].into_iter()
    }
}
