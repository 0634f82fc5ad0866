mod domain;
pub use domain::{OWNER_NONE, SCOPE_ORGANIZATION, SCOPE_USER, TAG_OWNER, TAG_SCOPE};
pub use domain::{Scope, TagMap, UserId};

mod error;
pub use error::{ModelError, ModelResult};

mod spec;
pub use spec::{JobRequest, ProvisionerRequest, TagSources};
