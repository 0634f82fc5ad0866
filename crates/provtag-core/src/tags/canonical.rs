use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use provtag_model::{Scope, TAG_OWNER, TAG_SCOPE, TagMap, UserId};

use crate::error::CoreError;

/// Tag map whose `scope` and `owner` entries are reconciled.
///
/// Produced by [`crate::tags::normalize`] or by validating a persisted map with
/// [`CanonicalTags::from_persisted`]. There is no way to mutate it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalTags(TagMap);

impl CanonicalTags {
    pub(crate) fn from_resolved(tags: TagMap) -> Self {
        Self(tags)
    }

    /// Accept a descriptor read back from storage.
    ///
    /// Checks that `scope` is a valid literal, that `owner` is present, empty
    /// for organization scope and a non-nil UUID in lowercase hyphenated form
    /// for user scope. Any other spelling of the same UUID is rejected, since
    /// matching compares owners as plain strings. Whether that UUID is the
    /// right user can only be established at creation time.
    pub fn from_persisted(tags: TagMap) -> Result<Self, CoreError> {
        let scope: Scope = tags
            .get(TAG_SCOPE)
            .ok_or_else(|| CoreError::NotCanonical("missing scope tag".into()))?
            .parse()?;
        let owner = tags
            .get(TAG_OWNER)
            .ok_or_else(|| CoreError::NotCanonical("missing owner tag".into()))?;

        match scope {
            Scope::Organization if !owner.is_empty() => Err(CoreError::NotCanonical(format!(
                "organization scope with owner {owner:?}"
            ))),
            Scope::User => match owner.parse::<UserId>() {
                Ok(id) if !id.is_nil() && id.hyphenated().to_string() == owner => {
                    Ok(Self(tags))
                }
                _ => Err(CoreError::NotCanonical(format!(
                    "user scope with invalid owner {owner:?}"
                ))),
            },
            Scope::Organization => Ok(Self(tags)),
        }
    }

    /// Scope of the descriptor.
    pub fn scope(&self) -> Scope {
        self.0
            .get(TAG_SCOPE)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Owning user for user-scoped descriptors.
    pub fn owner(&self) -> Option<UserId> {
        self.0.get(TAG_OWNER).and_then(|s| s.parse().ok())
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: both reserved keys are present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter()
    }

    /// Non-reserved capability tags.
    pub fn capabilities(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(k, _)| *k != TAG_SCOPE && *k != TAG_OWNER)
    }

    #[inline]
    pub fn as_map(&self) -> &TagMap {
        &self.0
    }
}

impl AsRef<TagMap> for CanonicalTags {
    fn as_ref(&self) -> &TagMap {
        &self.0
    }
}

impl TryFrom<TagMap> for CanonicalTags {
    type Error = CoreError;
    fn try_from(tags: TagMap) -> Result<Self, Self::Error> {
        Self::from_persisted(tags)
    }
}

impl<'de> Deserialize<'de> for CanonicalTags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tags = TagMap::deserialize(deserializer)?;
        Self::from_persisted(tags).map_err(serde::de::Error::custom)
    }
}

/// Renders as `key=value` pairs in key order, e.g. `owner=,region=us,scope=organization`.
impl fmt::Display for CanonicalTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::normalize;
    use provtag_model::{ModelError, SCOPE_ORGANIZATION, SCOPE_USER};

    #[test]
    fn accessors_reflect_normalized_scope() {
        let me = UserId::new_v4();
        let src = TagMap::new().with(TAG_SCOPE, SCOPE_USER).with("gpu", "a100");
        let tags = normalize(Some(me), [&src]);

        assert_eq!(tags.scope(), Scope::User);
        assert_eq!(tags.owner(), Some(me));
        assert_eq!(tags.capabilities().collect::<Vec<_>>(), vec![("gpu", "a100")]);
        assert!(!tags.is_empty());
    }

    #[test]
    fn organization_has_no_owner() {
        let empty: [&TagMap; 0] = [];
        let tags = normalize(None, empty);
        assert_eq!(tags.scope(), Scope::Organization);
        assert_eq!(tags.owner(), None);
        assert_eq!(tags.to_string(), "owner=,scope=organization");
    }

    #[test]
    fn persisted_canonical_maps_are_accepted() {
        let me = UserId::new_v4();
        let user = TagMap::new()
            .with(TAG_SCOPE, SCOPE_USER)
            .with(TAG_OWNER, me.to_string())
            .with("region", "us");
        let org = TagMap::new()
            .with(TAG_SCOPE, SCOPE_ORGANIZATION)
            .with(TAG_OWNER, "");

        assert_eq!(CanonicalTags::from_persisted(user.clone()).unwrap().as_map(), &user);
        assert_eq!(CanonicalTags::try_from(org.clone()).unwrap().as_map(), &org);
    }

    #[test]
    fn persisted_maps_violating_invariants_are_rejected() {
        let me = UserId::new_v4().to_string();
        let bad = [
            TagMap::new().with(TAG_OWNER, ""),
            TagMap::new().with(TAG_SCOPE, SCOPE_ORGANIZATION),
            TagMap::new().with(TAG_SCOPE, SCOPE_ORGANIZATION).with(TAG_OWNER, me.as_str()),
            TagMap::new().with(TAG_SCOPE, SCOPE_USER).with(TAG_OWNER, ""),
            TagMap::new().with(TAG_SCOPE, SCOPE_USER).with(TAG_OWNER, "alice"),
            TagMap::new()
                .with(TAG_SCOPE, SCOPE_USER)
                .with(TAG_OWNER, UserId::nil().to_string()),
        ];

        for tags in bad {
            let res = CanonicalTags::from_persisted(tags.clone());
            assert!(
                matches!(res, Err(CoreError::NotCanonical(_))),
                "expected NotCanonical for {tags:?}, got {res:?}"
            );
        }
    }

    #[test]
    fn persisted_owner_must_use_the_normalized_spelling() {
        let me = UserId::new_v4();
        let spellings = [
            me.simple().to_string(),
            me.hyphenated().to_string().to_uppercase(),
            me.urn().to_string(),
            me.braced().to_string(),
        ];

        for owner in spellings {
            let tags = TagMap::new().with(TAG_SCOPE, SCOPE_USER).with(TAG_OWNER, owner.as_str());
            let res = CanonicalTags::from_persisted(tags);
            assert!(
                matches!(res, Err(CoreError::NotCanonical(_))),
                "expected NotCanonical for owner {owner:?}, got {res:?}"
            );
        }

        let job = normalize(Some(me), [&TagMap::new().with(TAG_SCOPE, SCOPE_USER)]);
        let restored = CanonicalTags::from_persisted(job.as_map().clone()).unwrap();
        assert!(crate::matcher::eligible(job.as_map(), restored.as_map()));
    }

    #[test]
    fn persisted_unknown_scope_is_a_model_error() {
        let tags = TagMap::new().with(TAG_SCOPE, "360noscope").with(TAG_OWNER, "");
        let res = CanonicalTags::from_persisted(tags);
        assert!(matches!(res, Err(CoreError::Model(ModelError::UnknownScope(_)))));
    }

    #[test]
    fn serde_validates_on_the_way_in() {
        let tags = normalize(Some(UserId::new_v4()), [&TagMap::new().with(TAG_SCOPE, SCOPE_USER)]);
        let json = serde_json::to_string(&tags).unwrap();
        let back: CanonicalTags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tags);

        let forged = r#"{"scope":"organization","owner":"6f1c2a4e-3b7d-4c8e-9a0f-1d2e3f4a5b6c"}"#;
        assert!(serde_json::from_str::<CanonicalTags>(forged).is_err());
    }
}
