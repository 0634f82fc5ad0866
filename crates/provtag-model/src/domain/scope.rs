use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::{
    domain::{SCOPE_ORGANIZATION, SCOPE_USER},
    error::{ModelError, ModelResult},
};

/// Visibility class of a job or provisioner descriptor.
///
/// - `Organization`: shared pool, any organization job may run there.
/// - `User`: personal compute, bound to exactly one owner.
///
/// Literals are matched exactly: `"User"` or `" user"` are not valid scopes.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Organization-wide descriptor without an owner.
    #[default]
    Organization,
    /// Descriptor bound to a single user.
    User,
}

impl Scope {
    /// Wire literal stored under the `scope` tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Scope::Organization => SCOPE_ORGANIZATION,
            Scope::User => SCOPE_USER,
        }
    }
}

impl FromStr for Scope {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s {
            SCOPE_ORGANIZATION => Ok(Scope::Organization),
            SCOPE_USER => Ok(Scope::User),
            other => Err(ModelError::UnknownScope(other.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
