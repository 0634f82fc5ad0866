mod tags;
pub use tags::TagMap;

mod scope;
pub use scope::Scope;

mod constants;
pub use constants::{OWNER_NONE, SCOPE_ORGANIZATION, SCOPE_USER, TAG_OWNER, TAG_SCOPE};

/// Identity of an authenticated user.
///
/// Written into the `owner` tag in its hyphenated textual form.
/// The nil UUID carries no identity and is treated like an anonymous caller.
pub type UserId = uuid::Uuid;
