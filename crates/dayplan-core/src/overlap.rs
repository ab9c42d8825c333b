//! Overlap detection for scheduled works.
//!
//! Two half-open intervals `[s1, e1)` and `[s2, e2)` overlap iff
//! `s1 < e2 && s2 < e1`; touching edges are not overlaps. Only works with a
//! start date participate; unscheduled works are excluded by the repository
//! query itself, not filtered afterwards.

use crate::error::CoreError;
use crate::repository::WorkRepository;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Symmetric half-open intersection test.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Count of the owner's persisted works intersecting `interval`, optionally
/// ignoring one work id (re-validating an edit against its own interval).
/// Purely a read.
pub async fn count_overlaps<R: WorkRepository>(
    repo: &R,
    owner_id: &str,
    interval: Interval,
    exclude: Option<Uuid>,
) -> Result<i64, CoreError> {
    repo.count_overlapping_works(owner_id, interval.start, interval.end, exclude)
        .await
}

pub async fn has_overlap<R: WorkRepository>(
    repo: &R,
    owner_id: &str,
    interval: Interval,
    exclude: Option<Uuid>,
) -> Result<bool, CoreError> {
    Ok(count_overlaps(repo, owner_id, interval, exclude).await? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn iv(start: i64, end: i64) -> Interval {
        Interval::new(at(start), at(end))
    }

    #[test]
    fn test_overlapping_intervals() {
        assert!(iv(10, 20).overlaps(&iv(15, 25)));
        assert!(iv(10, 20).overlaps(&iv(5, 15)));
        assert!(iv(10, 20).overlaps(&iv(12, 18)));
        assert!(iv(12, 18).overlaps(&iv(10, 20)));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        assert!(!iv(10, 20).overlaps(&iv(20, 30)));
        assert!(!iv(20, 30).overlaps(&iv(10, 20)));
    }

    #[test]
    fn test_disjoint_intervals() {
        assert!(!iv(10, 20).overlaps(&iv(30, 40)));
    }

    proptest! {
        #[test]
        fn prop_overlap_matches_definition(
            s1 in 0i64..1_000_000, d1 in 1i64..100_000,
            s2 in 0i64..1_000_000, d2 in 1i64..100_000,
        ) {
            let a = iv(s1, s1 + d1);
            let b = iv(s2, s2 + d2);
            let expected = a.start < b.end && b.start < a.end;
            prop_assert_eq!(a.overlaps(&b), expected);
        }

        #[test]
        fn prop_overlap_is_symmetric(
            s1 in 0i64..1_000_000, d1 in 1i64..100_000,
            s2 in 0i64..1_000_000, d2 in 1i64..100_000,
        ) {
            let a = iv(s1, s1 + d1);
            let b = iv(s2, s2 + d2);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_interval_overlaps_itself(
            s in 0i64..1_000_000, d in 1i64..100_000,
        ) {
            let a = iv(s, s + d);
            prop_assert!(a.overlaps(&a));
        }
    }
}
