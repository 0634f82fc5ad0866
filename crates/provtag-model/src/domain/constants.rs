//! Reserved tag keys and their well-known values.
//!
//! Every canonical descriptor carries both reserved keys.
//! All other keys are opaque capability tags compared by exact string equality.

/// Tag key holding the descriptor scope (`organization` or `user`).
pub const TAG_SCOPE: &str = "scope";

/// Tag key holding the owning user identity.
///
/// Non-empty only when `scope = user`.
pub const TAG_OWNER: &str = "owner";

/// Scope literal for descriptors shared by the whole organization.
pub const SCOPE_ORGANIZATION: &str = "organization";

/// Scope literal for descriptors bound to a single user.
pub const SCOPE_USER: &str = "user";

/// Owner value of organization-scoped descriptors.
pub const OWNER_NONE: &str = "";
