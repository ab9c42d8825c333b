//! Day recovery: clone one day's works onto another date with a uniform
//! time shift, tag the clones as drafts, and flag conflicts against the
//! target day's schedule.
//!
//! Recovery is idempotent: every run first purges the owner's draft-tagged
//! works on the target day, so repeating a recovery replaces the previous
//! clone set instead of accumulating duplicates. Clones are persisted
//! immediately as drafts; `commit_drafts` / `discard_drafts` finish or roll
//! back the recovery once the user has reviewed the conflict flags.

use crate::calendar;
use crate::error::{CoreError, ErrorCategory, ErrorCode};
use crate::labels::{keys, LabelResolver};
use crate::models::{Label, RecoveredWork, SubTask, Work};
use crate::overlap::Interval;
use crate::repository::Repository;
use crate::works::project_views;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Day boundaries of both dates plus the uniform shift between them.
#[derive(Debug, Clone, Copy)]
struct RecoveryWindow {
    source_start: DateTime<Utc>,
    source_end: DateTime<Utc>,
    target_start: DateTime<Utc>,
    target_end: DateTime<Utc>,
    /// `startOfDay(target) - startOfDay(source)`; negative when recovering
    /// onto an earlier date.
    shift: Duration,
}

impl RecoveryWindow {
    fn from_millis(source_date: i64, target_date: i64) -> Result<Self, CoreError> {
        let source = calendar::from_millis(source_date)?;
        let target = calendar::from_millis(target_date)?;
        let (source_start, source_end) = calendar::day_bounds(source);
        let (target_start, target_end) = calendar::day_bounds(target);

        Ok(Self {
            source_start,
            source_end,
            target_start,
            target_end,
            shift: target_start - source_start,
        })
    }
}

pub struct RecoveryService<R> {
    repo: Arc<R>,
    labels: LabelResolver<R>,
}

impl<R: Repository> RecoveryService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            labels: LabelResolver::new(Arc::clone(&repo)),
            repo,
        }
    }

    /// Reconstruct `target_date` from `source_date` for one owner. Both
    /// dates are wire instants; only their calendar days matter. Returns one
    /// item per source work, in source order, each carrying the persisted
    /// draft clone's view and its conflict flag. A day with no source works
    /// yields an empty result and performs no inserts.
    pub async fn recover_day(
        &self,
        owner_id: &str,
        source_date: i64,
        target_date: i64,
    ) -> Result<Vec<RecoveredWork>, CoreError> {
        let window = RecoveryWindow::from_millis(source_date, target_date)?;

        // A missing draft label would make clones untaggable; fail before
        // any mutation.
        let draft = self.resolve_draft_label().await?;
        let in_progress = self.labels.resolve(keys::IN_PROGRESS).await?;

        let purged = self
            .repo
            .delete_drafts_in_range(owner_id, window.target_start, window.target_end)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "failed to purge stale drafts");
                err
            })?;
        if purged > 0 {
            tracing::debug!(purged, owner_id, "purged stale draft works on target day");
        }

        let sources = self
            .repo
            .find_works_touching_range(owner_id, window.source_start, window.source_end)
            .await?;
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        // Conflict baseline: whatever remains on the target day after the
        // draft purge.
        let baseline = self
            .repo
            .find_scheduled_works_in_range(owner_id, window.target_start, window.target_end, None)
            .await?;

        let source_ids: Vec<Uuid> = sources.iter().map(|w| w.id).collect();
        let mut source_sub_tasks: HashMap<Uuid, Vec<SubTask>> = HashMap::new();
        for sub_task in self.repo.find_sub_tasks_by_works(&source_ids).await? {
            source_sub_tasks
                .entry(sub_task.work_id)
                .or_default()
                .push(sub_task);
        }

        let now = Utc::now();
        let mut clones = Vec::with_capacity(sources.len());
        let mut cloned_sub_tasks = Vec::new();
        let mut conflicts = Vec::with_capacity(sources.len());

        for source in &sources {
            let clone = clone_work(source, window.shift, &in_progress, &draft, now);
            conflicts.push(is_conflicting(&clone, &baseline));
            if let Some(sub_tasks) = source_sub_tasks.get(&source.id) {
                cloned_sub_tasks.extend(clone_sub_tasks(sub_tasks, clone.id, now));
            }
            clones.push(clone);
        }

        self.repo.bulk_insert_works(&clones).await.map_err(|err| {
            tracing::error!(error = %err, "failed to insert recovered works");
            err
        })?;

        // Works are the primary unit of recovery; losing subtask detail is
        // an accepted partial failure, surfaced as a log only.
        if let Err(err) = self.repo.bulk_insert_sub_tasks(&cloned_sub_tasks).await {
            tracing::warn!(error = %err, "recovered works inserted but subtask clones failed");
        }

        let views = project_views(self.repo.as_ref(), &self.labels, clones, false).await?;
        Ok(views
            .into_iter()
            .zip(conflicts)
            .map(|(work, is_conflict)| RecoveredWork { work, is_conflict })
            .collect())
    }

    /// Confirm recovered drafts: clears the draft tag on the given owned
    /// draft works. Unknown, foreign, or non-draft ids are ignored. Returns
    /// the number of works committed.
    pub async fn commit_drafts(
        &self,
        owner_id: &str,
        work_ids: &[String],
    ) -> Result<u64, CoreError> {
        if work_ids.is_empty() {
            return Ok(0);
        }
        let draft = self.resolve_draft_label().await?;
        let ids = parse_work_ids(work_ids)?;
        let committed = self.repo.commit_drafts(owner_id, &ids, draft.id).await?;
        tracing::info!(committed, owner_id, "committed recovery drafts");
        Ok(committed)
    }

    /// Discard recovered drafts: deletes the given owned draft works (their
    /// subtask clones cascade). Returns the number of works removed.
    pub async fn discard_drafts(
        &self,
        owner_id: &str,
        work_ids: &[String],
    ) -> Result<u64, CoreError> {
        if work_ids.is_empty() {
            return Ok(0);
        }
        let draft = self.resolve_draft_label().await?;
        let ids = parse_work_ids(work_ids)?;
        let discarded = self.repo.delete_drafts_by_ids(owner_id, &ids, draft.id).await?;
        tracing::info!(discarded, owner_id, "discarded recovery drafts");
        Ok(discarded)
    }

    async fn resolve_draft_label(&self) -> Result<Label, CoreError> {
        self.labels.try_resolve(keys::DRAFT).await?.ok_or_else(|| {
            CoreError::validation(
                ErrorCategory::NotFound,
                ErrorCode::DraftNotFound,
                "draft label is not seeded",
            )
        })
    }
}

fn parse_work_ids(work_ids: &[String]) -> Result<Vec<Uuid>, CoreError> {
    work_ids
        .iter()
        .map(|id| {
            Uuid::parse_str(id).map_err(|_| {
                CoreError::validation(
                    ErrorCategory::NotFound,
                    ErrorCode::WorkNotFound,
                    format!("invalid Work Id {id}"),
                )
            })
        })
        .collect()
}

/// A fresh-identity copy of `source` shifted by `shift`, stamped as an
/// in-progress draft. Descriptive fields and label references carry over.
fn clone_work(
    source: &Work,
    shift: Duration,
    in_progress: &Label,
    draft: &Label,
    now: DateTime<Utc>,
) -> Work {
    Work {
        id: Uuid::now_v7(),
        owner_id: source.owner_id.clone(),
        name: source.name.clone(),
        name_normalized: source.name_normalized.clone(),
        short_description: source.short_description.clone(),
        detailed_description: source.detailed_description.clone(),
        start_date: source.start_date.map(|start| start + shift),
        end_date: source.end_date + shift,
        status_id: in_progress.id,
        difficulty_id: source.difficulty_id,
        priority_id: source.priority_id,
        type_id: source.type_id,
        category_id: source.category_id,
        goal_id: source.goal_id,
        draft_id: Some(draft.id),
        created_at: now,
        updated_at: now,
    }
}

/// Fresh-identity subtask copies with completion reset.
fn clone_sub_tasks(sub_tasks: &[SubTask], work_id: Uuid, now: DateTime<Utc>) -> Vec<SubTask> {
    sub_tasks
        .iter()
        .map(|sub_task| SubTask {
            id: Uuid::now_v7(),
            work_id,
            name: sub_task.name.clone(),
            is_completed: false,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

/// A clone conflicts when it is scheduled and its shifted interval overlaps
/// any baseline work. Unscheduled clones never conflict.
fn is_conflicting(clone: &Work, baseline: &[Work]) -> bool {
    let Some(start) = clone.start_date else {
        return false;
    };
    let candidate = Interval::new(start, clone.end_date);
    baseline.iter().any(|work| {
        work.start_date
            .map(|existing_start| candidate.overlaps(&Interval::new(existing_start, work.end_date)))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn label(key: &str) -> Label {
        Label {
            id: Uuid::now_v7(),
            key: key.to_string(),
            name: key.to_string(),
            meaning: None,
            note: None,
            color: None,
            kind: crate::models::LabelKind::Status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn work(start: Option<&str>, end: &str) -> Work {
        Work {
            id: Uuid::now_v7(),
            owner_id: "user-1".to_string(),
            name: "Gym".to_string(),
            name_normalized: "gym".to_string(),
            short_description: None,
            detailed_description: None,
            start_date: start.map(at),
            end_date: at(end),
            status_id: Uuid::now_v7(),
            difficulty_id: Uuid::now_v7(),
            priority_id: Uuid::now_v7(),
            type_id: Uuid::now_v7(),
            category_id: Uuid::now_v7(),
            goal_id: None,
            draft_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_window_shift_spans_whole_days() {
        let day1 = at("2025-03-01T10:30:00Z").timestamp_millis();
        let day5 = at("2025-03-05T07:15:00Z").timestamp_millis();
        let window = RecoveryWindow::from_millis(day1, day5).unwrap();
        assert_eq!(window.shift, Duration::days(4));
        assert_eq!(window.target_start, at("2025-03-05T00:00:00Z"));
    }

    #[test]
    fn test_window_shift_can_be_negative() {
        let day5 = at("2025-03-05T00:00:00Z").timestamp_millis();
        let day1 = at("2025-03-01T23:59:00Z").timestamp_millis();
        let window = RecoveryWindow::from_millis(day5, day1).unwrap();
        assert_eq!(window.shift, Duration::days(-4));
    }

    #[test]
    fn test_clone_work_shifts_interval_and_tags_draft() {
        let source = work(Some("2025-03-01T08:00:00Z"), "2025-03-01T09:00:00Z");
        let in_progress = label("IN_PROGRESS");
        let draft = label("DRAFT");

        let clone = clone_work(&source, Duration::days(4), &in_progress, &draft, Utc::now());
        assert_ne!(clone.id, source.id);
        assert_eq!(clone.start_date, Some(at("2025-03-05T08:00:00Z")));
        assert_eq!(clone.end_date, at("2025-03-05T09:00:00Z"));
        assert_eq!(clone.status_id, in_progress.id);
        assert_eq!(clone.draft_id, Some(draft.id));
        assert_eq!(clone.name, source.name);
    }

    #[test]
    fn test_clone_of_unscheduled_work_stays_unscheduled() {
        let source = work(None, "2025-03-01T22:00:00Z");
        let clone = clone_work(
            &source,
            Duration::days(1),
            &label("IN_PROGRESS"),
            &label("DRAFT"),
            Utc::now(),
        );
        assert_eq!(clone.start_date, None);
        assert_eq!(clone.end_date, at("2025-03-02T22:00:00Z"));
    }

    #[test]
    fn test_clone_sub_tasks_reset_completion() {
        let parent = Uuid::now_v7();
        let original = SubTask {
            id: Uuid::now_v7(),
            work_id: Uuid::now_v7(),
            name: "Warm up".to_string(),
            is_completed: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let clones = clone_sub_tasks(std::slice::from_ref(&original), parent, Utc::now());
        assert_eq!(clones.len(), 1);
        assert_ne!(clones[0].id, original.id);
        assert_eq!(clones[0].work_id, parent);
        assert!(!clones[0].is_completed);
    }

    #[test]
    fn test_conflict_detection_against_baseline() {
        let baseline = vec![work(Some("2025-03-05T08:30:00Z"), "2025-03-05T09:30:00Z")];

        let colliding = work(Some("2025-03-05T08:00:00Z"), "2025-03-05T09:00:00Z");
        assert!(is_conflicting(&colliding, &baseline));

        let touching = work(Some("2025-03-05T09:30:00Z"), "2025-03-05T10:30:00Z");
        assert!(!is_conflicting(&touching, &baseline));

        let unscheduled = work(None, "2025-03-05T09:00:00Z");
        assert!(!is_conflicting(&unscheduled, &baseline));
    }
}
