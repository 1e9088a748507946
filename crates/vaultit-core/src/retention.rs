//! Retention classification: decide which artifacts survive.
//!
//! The classifier is a pure function of (artifacts, now, policy). It
//! holds no state between runs; every invocation re-derives the
//! decision from the current listing and wall-clock.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};

use crate::artifact::{Artifact, Location};
use crate::policy::RetentionPolicy;

/// Age tier an artifact falls into.
///
/// Windows are half-open on the young side: an age exactly equal to a
/// window threshold belongs to the older bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Younger than the daily window; always kept.
    Daily,
    /// One survivor per ISO calendar week.
    Weekly,
    /// One survivor per calendar month.
    Monthly,
    /// At or past the monthly window; always deleted.
    Expired,
    /// Name does not parse to a timestamp; never touched.
    Unmanaged,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bucket::Daily => write!(f, "daily"),
            Bucket::Weekly => write!(f, "weekly"),
            Bucket::Monthly => write!(f, "monthly"),
            Bucket::Expired => write!(f, "expired"),
            Bucket::Unmanaged => write!(f, "unmanaged"),
        }
    }
}

/// Classify one artifact into its age tier.
pub fn bucket_for(artifact: &Artifact, now: DateTime<Utc>, policy: &RetentionPolicy) -> Bucket {
    let Some(timestamp) = artifact.timestamp else {
        return Bucket::Unmanaged;
    };
    let age = now - timestamp;
    if age < policy.daily_window() {
        Bucket::Daily
    } else if age < policy.weekly_window() {
        Bucket::Weekly
    } else if age < policy.monthly_window() {
        Bucket::Monthly
    } else {
        Bucket::Expired
    }
}

/// Calendar group a weekly/monthly artifact competes in.
///
/// Local and remote copies of the same backup carry the same name, so
/// the location is part of the key: each side rotates independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Week {
        location: Location,
        year: i32,
        week: u32,
    },
    Month {
        location: Location,
        year: i32,
        month: u32,
    },
}

/// Output of [`classify`]: a partition of the input artifacts.
///
/// `keep` and `delete` partition the managed input exactly; `unmanaged`
/// carries the rest for reporting. The three sets are disjoint and
/// together cover the full input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetentionDecision {
    pub keep: Vec<Artifact>,
    pub delete: Vec<Artifact>,
    /// Artifacts without a parseable timestamp; reported, never deleted.
    pub unmanaged: Vec<Artifact>,
}

/// Partition `artifacts` into keep/delete sets under `policy` as of `now`.
///
/// Grouping is by calendar week/month of the artifact's own timestamp,
/// not by N-day buckets anchored to `now`: the surviving artifact of a
/// group does not change merely because time advanced within the same
/// period, so repeated runs converge.
///
/// Survivor per group: latest timestamp, ties broken by the
/// lexicographically greatest name.
pub fn classify(
    artifacts: &[Artifact],
    now: DateTime<Utc>,
    policy: &RetentionPolicy,
) -> RetentionDecision {
    let mut decision = RetentionDecision::default();
    let mut groups: BTreeMap<GroupKey, Vec<Artifact>> = BTreeMap::new();

    for artifact in artifacts {
        match bucket_for(artifact, now, policy) {
            Bucket::Daily => decision.keep.push(artifact.clone()),
            Bucket::Expired => decision.delete.push(artifact.clone()),
            Bucket::Unmanaged => decision.unmanaged.push(artifact.clone()),
            Bucket::Weekly => {
                // bucket_for returned a managed tier, so the timestamp is present
                let Some(timestamp) = artifact.timestamp else {
                    continue;
                };
                let week = timestamp.iso_week();
                groups
                    .entry(GroupKey::Week {
                        location: artifact.location,
                        year: week.year(),
                        week: week.week(),
                    })
                    .or_default()
                    .push(artifact.clone());
            }
            Bucket::Monthly => {
                let Some(timestamp) = artifact.timestamp else {
                    continue;
                };
                groups
                    .entry(GroupKey::Month {
                        location: artifact.location,
                        year: timestamp.year(),
                        month: timestamp.month(),
                    })
                    .or_default()
                    .push(artifact.clone());
            }
        }
    }

    for (_key, mut group) in groups {
        group.sort_by(|a, b| (a.timestamp, a.name.as_str()).cmp(&(b.timestamp, b.name.as_str())));
        if let Some(survivor) = group.pop() {
            decision.keep.push(survivor);
            decision.delete.extend(group);
        }
    }

    debug_assert_eq!(
        decision.keep.len() + decision.delete.len() + decision.unmanaged.len(),
        artifacts.len(),
        "retention decision must partition its input"
    );

    decision
}
