//! Capability matching between a job descriptor and provisioner descriptors.
//!
//! A provisioner is eligible when its tags are a superset of the job's tags:
//! every job key must be present with the identical value. Reserved keys are
//! compared like any other key, which is what keeps user-scoped jobs on their
//! owner's provisioners and organization jobs on the shared pool.
//!
//! Everything here is a pure function over borrowed maps.
mod candidate;
pub use candidate::Candidate;

use provtag_model::TagMap;

/// Returns `true` if `worker` carries every `job` tag with an identical value.
pub fn eligible(job: &TagMap, worker: &TagMap) -> bool {
    job.iter().all(|(k, v)| worker.get(k) == Some(v))
}

/// Number of `worker` tags the job does not ask for.
///
/// Lower means a tighter fit. Only meaningful for eligible pairs.
pub fn specificity(job: &TagMap, worker: &TagMap) -> usize {
    worker.keys().filter(|k| !job.contains_key(k)).count()
}

/// Specificity of `worker` for `job`, or `None` if it is not eligible.
pub fn evaluate(job: &TagMap, worker: &TagMap) -> Option<usize> {
    eligible(job, worker).then(|| specificity(job, worker))
}

/// Eligible subset of `workers`, ordered by ascending specificity.
///
/// The sort is stable: equally specific workers keep the order of the
/// snapshot they came from, so the caller's own fairness ordering survives.
///
/// ```
/// use provtag_core::matcher::rank;
/// use provtag_model::TagMap;
///
/// let job = TagMap::new().with("region", "us");
/// let gpu = TagMap::new().with("region", "us").with("gpu", "a100");
/// let plain = TagMap::new().with("region", "us");
/// let eu = TagMap::new().with("region", "eu");
///
/// let ranked = rank(&job, [&gpu, &eu, &plain]);
/// assert_eq!(ranked.len(), 2);
/// assert_eq!(ranked[0].worker, &plain);
/// assert_eq!(ranked[0].specificity, 0);
/// ```
pub fn rank<W, I>(job: &TagMap, workers: I) -> Vec<Candidate<W>>
where
    I: IntoIterator<Item = W>,
    W: AsRef<TagMap>,
{
    let mut out: Vec<Candidate<W>> = workers
        .into_iter()
        .filter_map(|w| {
            let specificity = evaluate(job, w.as_ref())?;
            Some(Candidate::new(w, specificity))
        })
        .collect();
    out.sort_by_key(|c| c.specificity);
    out
}

/// Least specific eligible worker; the earliest one wins a tie.
pub fn preferred<W, I>(job: &TagMap, workers: I) -> Option<Candidate<W>>
where
    I: IntoIterator<Item = W>,
    W: AsRef<TagMap>,
{
    workers
        .into_iter()
        .filter_map(|w| {
            let specificity = evaluate(job, w.as_ref())?;
            Some(Candidate::new(w, specificity))
        })
        .min_by_key(|c| c.specificity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::normalize;
    use provtag_model::{SCOPE_ORGANIZATION, SCOPE_USER, TAG_OWNER, TAG_SCOPE, UserId};

    fn org(extra: &[(&str, &str)]) -> TagMap {
        let mut t: TagMap = extra.iter().copied().collect();
        t.insert(TAG_SCOPE, SCOPE_ORGANIZATION).insert(TAG_OWNER, "");
        t
    }

    fn user(owner: UserId, extra: &[(&str, &str)]) -> TagMap {
        let mut t: TagMap = extra.iter().copied().collect();
        t.insert(TAG_SCOPE, SCOPE_USER)
            .insert(TAG_OWNER, owner.to_string());
        t
    }

    #[test]
    fn organization_job_matching() {
        let job = org(&[("region", "us")]);

        assert_eq!(evaluate(&job, &org(&[("region", "us")])), Some(0));
        assert_eq!(evaluate(&job, &org(&[("region", "us"), ("gpu", "true")])), Some(1));
        assert_eq!(evaluate(&job, &org(&[("region", "eu")])), None);
        assert_eq!(evaluate(&job, &org(&[])), None);
    }

    #[test]
    fn user_job_matching() {
        let u = UserId::new_v4();
        let v = UserId::new_v4();
        let job = user(u, &[("region", "us")]);

        assert!(eligible(&job, &user(u, &[("region", "us")])));
        assert!(!eligible(&job, &org(&[("region", "us")])));
        assert!(!eligible(&job, &user(v, &[("region", "us")])));
    }

    #[test]
    fn organization_job_never_lands_on_user_provisioner() {
        let job = org(&[]);
        let personal = user(UserId::new_v4(), &[]);
        assert!(!eligible(&job, &personal));
    }

    #[test]
    fn worker_missing_a_job_key_is_not_eligible() {
        let job = org(&[("gpu", "")]);
        assert!(!eligible(&job, &org(&[])));
        assert!(eligible(&job, &org(&[("gpu", "")])));
    }

    #[test]
    fn specificity_counts_only_extra_worker_keys() {
        let job = org(&[("region", "us"), ("arch", "arm64")]);
        let worker = org(&[("region", "us"), ("arch", "arm64"), ("gpu", "a100"), ("disk", "ssd")]);
        assert_eq!(specificity(&job, &worker), 2);
        assert_eq!(specificity(&job, &job), 0);
    }

    #[test]
    fn rank_prefers_lowest_specificity() {
        let job = org(&[("region", "us")]);
        let wide = org(&[("region", "us"), ("gpu", "a100"), ("disk", "ssd")]);
        let exact = org(&[("region", "us")]);

        let ranked = rank(&job, [&wide, &exact]);
        let scores: Vec<_> = ranked.iter().map(|c| c.specificity).collect();
        assert_eq!(scores, vec![0, 2]);
        assert_eq!(ranked[0].worker, &exact);

        let best = preferred(&job, [&wide, &exact]).expect("two eligible workers");
        assert_eq!(best.worker, &exact);
        assert_eq!(best.specificity, 0);
    }

    #[test]
    fn rank_keeps_snapshot_order_between_ties() {
        let job = org(&[]);
        let workers: Vec<(usize, TagMap)> = (0..5)
            .map(|i| (i, org(&[("slot", if i % 2 == 0 { "a" } else { "b" })])))
            .collect();

        struct Named<'a>(usize, &'a TagMap);
        impl AsRef<TagMap> for Named<'_> {
            fn as_ref(&self) -> &TagMap {
                self.1
            }
        }

        let ranked = rank(&job, workers.iter().map(|(i, t)| Named(*i, t)));
        let order: Vec<_> = ranked.iter().map(|c| c.worker.0).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);

        let first = preferred(&job, workers.iter().map(|(i, t)| Named(*i, t))).unwrap();
        assert_eq!(first.worker.0, 0);
    }

    #[test]
    fn no_eligible_worker_is_an_empty_result() {
        let job = org(&[("region", "ap")]);
        let pool = [org(&[("region", "us")]), org(&[("region", "eu")])];

        assert!(rank(&job, pool.iter()).is_empty());
        assert!(preferred(&job, pool.iter()).is_none());
        assert!(rank(&job, std::iter::empty::<&TagMap>()).is_empty());
    }

    #[test]
    fn normalized_descriptors_route_to_owner_only() {
        let alice = UserId::new_v4();
        let bob = UserId::new_v4();
        let want_user = TagMap::new().with(TAG_SCOPE, SCOPE_USER);

        let job = normalize(Some(alice), [&want_user]);
        let alice_box = normalize(Some(alice), [&want_user]);
        // bob tries to advertise a box under alice's identity
        let spoof = want_user.clone().with(TAG_OWNER, alice.to_string());
        let bob_box = normalize(Some(bob), [&spoof]);
        let shared = normalize(None, [&TagMap::new()]);

        let ranked = rank(job.as_map(), [&bob_box, &shared, &alice_box]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].worker, &alice_box);
    }
}
