use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::{TagMap, UserId};

/// Registration of a provisioner daemon with its advertised tags.
///
/// `registered_by` is the identity the daemon authenticated with; a daemon
/// started with organization credentials carries `None`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProvisionerRequest {
    /// Unique provisioner name within a snapshot.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_by: Option<UserId>,
    /// Tags the daemon advertises (e.g. from `--tag key=value` flags).
    #[serde(default, skip_serializing_if = "TagMap::is_empty")]
    pub tags: TagMap,
}

impl ProvisionerRequest {
    pub fn new(name: impl Into<String>, tags: TagMap) -> Self {
        Self {
            name: name.into(),
            registered_by: None,
            tags,
        }
    }

    pub fn with_registered_by(mut self, user: UserId) -> Self {
        self.registered_by = Some(user);
        self
    }
}
