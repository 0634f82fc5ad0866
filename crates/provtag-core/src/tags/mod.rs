//! Tag normalization for job and provisioner descriptors.
//!
//! Tag layers are folded left to right into a map seeded with the organization defaults,
//! then [`resolve_scope`] binds `scope` and `owner` to the authenticated identity.
//! The result is a [`CanonicalTags`]; normalization is total and never fails.
mod canonical;
pub use canonical::CanonicalTags;

mod resolve;
pub use resolve::{Resolution, resolve_scope};

use provtag_model::{
    JobRequest, OWNER_NONE, ProvisionerRequest, SCOPE_ORGANIZATION, TAG_OWNER, TAG_SCOPE, TagMap,
    TagSources, UserId,
};

/// Map every fold starts from: organization scope, no owner.
pub fn defaults() -> TagMap {
    TagMap::new()
        .with(TAG_SCOPE, SCOPE_ORGANIZATION)
        .with(TAG_OWNER, OWNER_NONE)
}

/// Fold tag layers over [`defaults`] without reconciling scope.
///
/// A non-empty value sets or overrides its key; an empty value is skipped,
/// so it neither erases an earlier value nor establishes a new key.
pub fn merge<'a, I>(sources: I) -> TagMap
where
    I: IntoIterator<Item = &'a TagMap>,
{
    sources.into_iter().fold(defaults(), |mut acc, layer| {
        for (key, value) in layer.iter().filter(|(_, v)| !v.is_empty()) {
            acc.insert(key, value);
        }
        acc
    })
}

/// Normalize ordered tag layers into a canonical descriptor.
///
/// `user` is the authenticated caller; `None` and the nil UUID both mean "no identity".
///
/// ```
/// use provtag_core::tags::normalize;
/// use provtag_model::{TagMap, UserId};
///
/// let caller = UserId::new_v4();
/// let spoofed = TagMap::new()
///     .with("scope", "user")
///     .with("owner", UserId::new_v4().to_string());
///
/// let tags = normalize(Some(caller), [&spoofed]);
/// assert_eq!(tags.owner(), Some(caller));
/// ```
pub fn normalize<'a, I>(user: Option<UserId>, sources: I) -> CanonicalTags
where
    I: IntoIterator<Item = &'a TagMap>,
{
    normalize_with_resolution(user, sources).0
}

/// Same as [`normalize`], also reporting which reconciliation branch fired.
pub fn normalize_with_resolution<'a, I>(
    user: Option<UserId>,
    sources: I,
) -> (CanonicalTags, Resolution)
where
    I: IntoIterator<Item = &'a TagMap>,
{
    let mut merged = merge(sources);
    let resolution = resolve_scope(user, &mut merged);
    (CanonicalTags::from_resolved(merged), resolution)
}

/// Normalize the template/job/caller layers of a submission.
pub fn normalize_sources(user: Option<UserId>, sources: &TagSources) -> (CanonicalTags, Resolution) {
    normalize_with_resolution(user, sources.layers())
}

/// Descriptor of a submitted job, bound to its initiator.
pub fn normalize_job(req: &JobRequest) -> (CanonicalTags, Resolution) {
    normalize_sources(req.initiator, &req.sources)
}

/// Descriptor advertised by a provisioner, bound to the identity it registered with.
pub fn normalize_provisioner(req: &ProvisionerRequest) -> (CanonicalTags, Resolution) {
    normalize_with_resolution(req.registered_by, [&req.tags])
}
