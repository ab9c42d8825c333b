//! Daily recurrence expansion and conflict checking.
//!
//! A repeating work carries a base interval and a repeat window of calendar
//! days. Each day in the window yields one concrete instance: the day's date
//! combined with the base interval's clock time, extended by the base
//! duration. The duration is preserved rather than the end time-of-day, so
//! an instance may cross midnight; durations of 24 hours or more are
//! rejected because consecutive daily instances would overlap each other.

use crate::calendar;
use crate::error::{CoreError, ErrorCategory, ErrorCode};
use crate::overlap::Interval;
use crate::repository::WorkRepository;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use uuid::Uuid;

/// A bounded daily-repeat range, inclusive on both ends. Independent of the
/// base interval's time-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatWindow {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl RepeatWindow {
    pub fn new(first_day: NaiveDate, last_day: NaiveDate) -> Result<Self, CoreError> {
        if first_day > last_day {
            return Err(CoreError::validation(
                ErrorCategory::Internal,
                ErrorCode::RepeatWindowInvalid,
                "repeat window ends before it starts",
            ));
        }
        Ok(Self {
            first_day,
            last_day,
        })
    }

    /// Build a window from wire instants; only the calendar dates are kept.
    pub fn from_millis(first: i64, last: i64) -> Result<Self, CoreError> {
        let first_day = calendar::from_millis(first)?.date_naive();
        let last_day = calendar::from_millis(last)?.date_naive();
        Self::new(first_day, last_day)
    }

    pub fn instance_count(&self) -> i64 {
        (self.last_day - self.first_day).num_days() + 1
    }
}

/// Lazily yields one instance per day of the window, in ascending date
/// order. The ordering is load-bearing: the validator reports the *first*
/// conflicting date.
pub fn expand(base: Interval, window: RepeatWindow) -> DailyInstances {
    DailyInstances {
        next_day: Some(window.first_day),
        last_day: window.last_day,
        time_of_day: base.start.time(),
        duration: base.duration(),
    }
}

pub struct DailyInstances {
    next_day: Option<NaiveDate>,
    last_day: NaiveDate,
    time_of_day: chrono::NaiveTime,
    duration: Duration,
}

impl Iterator for DailyInstances {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        let day = self.next_day?;
        if day > self.last_day {
            self.next_day = None;
            return None;
        }
        self.next_day = day.succ_opt();

        let start = calendar::combine(day, self.time_of_day);
        Some(Interval::new(start, start + self.duration))
    }
}

/// Checks an entire repeat window against the persisted schedule.
pub struct RecurrenceExpander<R> {
    repo: Arc<R>,
}

impl<R> Clone for RecurrenceExpander<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: WorkRepository> RecurrenceExpander<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Verify that no daily instance of `base` over `window` intersects an
    /// existing scheduled work of `owner_id`. The existing set is fetched
    /// once for the whole window, so the store sees one query regardless of
    /// window length. The first conflicting day short-circuits and is named
    /// in the error.
    pub async fn ensure_no_conflicts(
        &self,
        owner_id: &str,
        base: Interval,
        window: RepeatWindow,
        exclude: Option<Uuid>,
    ) -> Result<(), CoreError> {
        let duration = base.duration();
        if duration >= Duration::days(1) {
            return Err(CoreError::validation(
                ErrorCategory::Internal,
                ErrorCode::RepeatWindowInvalid,
                "repeating work duration must be shorter than one day",
            ));
        }

        let range_start = calendar::combine(window.first_day, base.start.time());
        let range_end = calendar::combine(window.last_day, base.start.time()) + duration;
        let existing = self
            .repo
            .find_scheduled_works_in_range(owner_id, range_start, range_end, exclude)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "failed to prefetch works for overlap check");
                CoreError::validation(
                    ErrorCategory::Database,
                    ErrorCode::TimeOverlap,
                    "error retrieving works for overlap check",
                )
            })?;

        for instance in expand(base, window) {
            for work in &existing {
                let Some(existing_start) = work.start_date else {
                    continue;
                };
                if instance.overlaps(&Interval::new(existing_start, work.end_date)) {
                    return Err(CoreError::validation(
                        ErrorCategory::Database,
                        ErrorCode::TimeOverlap,
                        format!("work overlaps on {}", instance.start.format("%Y-%m-%d")),
                    ));
                }
            }
        }

        Ok(())
    }
}
