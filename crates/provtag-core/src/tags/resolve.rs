use std::fmt;

use provtag_model::{OWNER_NONE, SCOPE_ORGANIZATION, Scope, TAG_OWNER, TAG_SCOPE, TagMap, UserId};

/// Reconciliation branch taken by [`resolve_scope`].
///
/// Informational only: the canonical map is fully determined by the inputs,
/// this value lets callers log or count how it was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Organization scope, no owner had been supplied.
    Organization,
    /// Organization scope, a supplied owner was discarded.
    OwnerCleared,
    /// User scope bound to the authenticated caller.
    UserBound,
    /// User scope, a different supplied owner was replaced by the caller.
    OwnerOverridden,
    /// Scope literal was not recognised; reset to organization.
    InvalidScope,
    /// User scope requested without an identity; reset to organization.
    Unauthenticated,
}

impl Resolution {
    /// Return label value for logs and metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            Resolution::Organization => "organization",
            Resolution::OwnerCleared => "owner_cleared",
            Resolution::UserBound => "user_bound",
            Resolution::OwnerOverridden => "owner_overridden",
            Resolution::InvalidScope => "invalid_scope",
            Resolution::Unauthenticated => "unauthenticated",
        }
    }

    /// Returns `true` when the requested scope could not be honoured.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::InvalidScope | Resolution::Unauthenticated)
    }

    /// Returns `true` when a supplied `owner` literal was discarded or replaced.
    pub fn discarded_owner(&self) -> bool {
        matches!(self, Resolution::OwnerCleared | Resolution::OwnerOverridden)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Bind `scope` and `owner` of a merged map to the authenticated identity.
///
/// Must run after all layers are merged and before the map is used anywhere:
/// whatever `owner` the layers carried is overwritten here.
///
/// - unknown scope literal: `{scope: organization, owner: ""}`;
/// - `user` without identity (`None` or nil UUID): `{scope: organization, owner: ""}`;
/// - `user` with identity `U`: `owner = U`;
/// - `organization`: `owner = ""`.
///
/// A missing `scope` key is treated as `organization`.
pub fn resolve_scope(user: Option<UserId>, tags: &mut TagMap) -> Resolution {
    let user = user.filter(|u| !u.is_nil());
    let supplied_owner = tags
        .get(TAG_OWNER)
        .filter(|o| !o.is_empty())
        .map(str::to_owned);
    let scope = tags
        .get(TAG_SCOPE)
        .unwrap_or(SCOPE_ORGANIZATION)
        .parse::<Scope>();

    match (scope, user) {
        (Ok(Scope::User), Some(id)) => {
            let owner = id.to_string();
            let resolution = match supplied_owner {
                Some(prev) if prev != owner => Resolution::OwnerOverridden,
                _ => Resolution::UserBound,
            };
            tags.insert(TAG_SCOPE, Scope::User.as_str())
                .insert(TAG_OWNER, owner);
            resolution
        }
        (Ok(Scope::User), None) => {
            reset_to_organization(tags);
            Resolution::Unauthenticated
        }
        (Ok(Scope::Organization), _) => {
            reset_to_organization(tags);
            if supplied_owner.is_some() {
                Resolution::OwnerCleared
            } else {
                Resolution::Organization
            }
        }
        (Err(_), _) => {
            reset_to_organization(tags);
            Resolution::InvalidScope
        }
    }
}

fn reset_to_organization(tags: &mut TagMap) {
    tags.insert(TAG_SCOPE, SCOPE_ORGANIZATION)
        .insert(TAG_OWNER, OWNER_NONE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use provtag_model::SCOPE_USER;

    #[test]
    fn missing_keys_resolve_to_organization() {
        let mut tags = TagMap::new();
        let res = resolve_scope(Some(UserId::new_v4()), &mut tags);

        assert_eq!(res, Resolution::Organization);
        assert_eq!(tags.get(TAG_SCOPE), Some(SCOPE_ORGANIZATION));
        assert_eq!(tags.get(TAG_OWNER), Some(""));
    }

    #[test]
    fn same_owner_is_not_reported_as_override() {
        let me = UserId::new_v4();
        let mut tags = TagMap::new()
            .with(TAG_SCOPE, SCOPE_USER)
            .with(TAG_OWNER, me.to_string());

        assert_eq!(resolve_scope(Some(me), &mut tags), Resolution::UserBound);
        assert_eq!(tags.get(TAG_OWNER), Some(me.to_string().as_str()));
    }

    #[test]
    fn invalid_scope_discards_owner_even_when_authenticated() {
        let me = UserId::new_v4();
        let mut tags = TagMap::new()
            .with(TAG_SCOPE, "360noscope")
            .with(TAG_OWNER, me.to_string());

        assert_eq!(resolve_scope(Some(me), &mut tags), Resolution::InvalidScope);
        assert_eq!(tags.get(TAG_OWNER), Some(""));
    }

    #[test]
    fn passthrough_keys_are_untouched() {
        let mut tags = TagMap::new().with("region", "us").with(TAG_SCOPE, SCOPE_USER);
        resolve_scope(None, &mut tags);
        assert_eq!(tags.get("region"), Some("us"));
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn labels_and_flags() {
        assert_eq!(Resolution::OwnerOverridden.to_string(), "owner_overridden");
        assert!(Resolution::InvalidScope.is_fallback());
        assert!(Resolution::Unauthenticated.is_fallback());
        assert!(!Resolution::UserBound.is_fallback());
        assert!(Resolution::OwnerCleared.discarded_owner());
        assert!(!Resolution::Organization.discarded_owner());
    }
}
