//! Request validation for works and goals.
//!
//! Validators are read-only: every check here happens before the caller
//! performs any mutation. Failures carry a `ValidationError` with the exact
//! rule that was violated so the RPC layer can map it to a stable wire code.

use crate::calendar;
use crate::error::{CoreError, ErrorCategory, ErrorCode};
use crate::labels::{keys, LabelResolver};
use crate::overlap::{self, Interval};
use crate::recurrence::{RecurrenceExpander, RepeatWindow};
use crate::repository::{GoalRepository, LabelRepository, WorkRepository};
use std::sync::Arc;
use uuid::Uuid;

fn parse_id(id: &str, category: ErrorCategory, code: ErrorCode, message: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(id).map_err(|_| CoreError::validation(category, code, message))
}

/// Validates work create/update payloads.
pub struct WorkValidator<R> {
    repo: Arc<R>,
    labels: LabelResolver<R>,
    expander: RecurrenceExpander<R>,
}

impl<R: WorkRepository + LabelRepository> WorkValidator<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            labels: LabelResolver::new(Arc::clone(&repo)),
            expander: RecurrenceExpander::new(Arc::clone(&repo)),
            repo,
        }
    }

    /// Full upsert validation, in order: label references, goal reference,
    /// subtask ids, date sanity, overlap (repeat-aware), then ownership on
    /// update. The first failed rule wins.
    pub async fn validate_upsert(
        &self,
        req: &crate::models::UpsertWorkData,
    ) -> Result<(), CoreError> {
        let type_id = self.labels.ensure_ref(&req.type_id, "TypeId").await?;
        self.labels.ensure_ref(&req.status_id, "StatusId").await?;
        self.labels
            .ensure_ref(&req.difficulty_id, "DifficultyId")
            .await?;
        self.labels
            .ensure_ref(&req.priority_id, "PriorityId")
            .await?;
        self.labels
            .ensure_ref(&req.category_id, "CategoryId")
            .await?;

        // An empty goal reference means "no goal"; a non-empty one must at
        // least be well-formed.
        if let Some(goal_id) = req.goal_id.as_deref().filter(|g| !g.is_empty()) {
            parse_id(
                goal_id,
                ErrorCategory::NotFound,
                ErrorCode::GoalNotFound,
                "invalid GoalId",
            )?;
        }

        for sub_task in &req.sub_tasks {
            if let Some(id) = sub_task.id.as_deref().filter(|id| !id.is_empty()) {
                parse_id(
                    id,
                    ErrorCategory::NotFound,
                    ErrorCode::SubTaskNotFound,
                    "invalid SubTask Id",
                )?;
            }
        }

        if let Some(start_ms) = req.start_date {
            let start = calendar::from_millis(start_ms)?;
            let end = calendar::from_millis(req.end_date)?;

            if start == end {
                return Err(CoreError::validation(
                    ErrorCategory::Internal,
                    ErrorCode::ZeroDuration,
                    "work duration cannot be zero",
                ));
            }
            if end < start {
                return Err(CoreError::validation(
                    ErrorCategory::Internal,
                    ErrorCode::EndDateBeforeStart,
                    "EndDate must be after StartDate",
                ));
            }

            let repeated = self.labels.try_resolve(keys::REPEATED).await?;
            let is_repeated = repeated.map(|label| label.id == type_id).unwrap_or(false);

            let exclude = req
                .id
                .as_deref()
                .filter(|id| !id.is_empty())
                .and_then(|id| Uuid::parse_str(id).ok());

            if is_repeated {
                let window = match (req.repeat_first_day, req.repeat_last_day) {
                    (Some(first), Some(last)) => RepeatWindow::from_millis(first, last)?,
                    _ => {
                        return Err(CoreError::validation(
                            ErrorCategory::Internal,
                            ErrorCode::RepeatWindowMissing,
                            "repeated work requires repeat window dates",
                        ))
                    }
                };
                self.expander
                    .ensure_no_conflicts(&req.owner_id, Interval::new(start, end), window, exclude)
                    .await?;
            } else {
                let count = overlap::count_overlaps(
                    self.repo.as_ref(),
                    &req.owner_id,
                    Interval::new(start, end),
                    exclude,
                )
                .await
                .map_err(|err| {
                    tracing::error!(error = %err, "failed to count overlapping works");
                    CoreError::validation(
                        ErrorCategory::Database,
                        ErrorCode::TimeOverlap,
                        "error checking overlapping works",
                    )
                })?;
                if count > 0 {
                    return Err(CoreError::validation(
                        ErrorCategory::Database,
                        ErrorCode::TimeOverlap,
                        "work time overlaps with existing work",
                    ));
                }
            }
        }

        if let Some(id) = req.id.as_deref().filter(|id| !id.is_empty()) {
            let work_id = parse_id(
                id,
                ErrorCategory::NotFound,
                ErrorCode::WorkNotFound,
                "invalid Work Id",
            )?;
            let existing = self.repo.find_work_by_id(work_id).await.map_err(|err| {
                tracing::error!(error = %err, "failed to load work for ownership check");
                CoreError::validation(
                    ErrorCategory::Database,
                    ErrorCode::WorkNotFound,
                    "error retrieving work",
                )
            })?;
            let existing = existing.ok_or_else(|| {
                CoreError::validation(
                    ErrorCategory::NotFound,
                    ErrorCode::WorkNotFound,
                    "work not found",
                )
            })?;
            if existing.owner_id != req.owner_id {
                return Err(CoreError::validation(
                    ErrorCategory::PermissionDenied,
                    ErrorCode::WorkForbidden,
                    "user does not have permission to modify this work",
                ));
            }
        }

        Ok(())
    }
}

/// Validates goal create/update payloads, including the active-goal cap.
pub struct GoalValidator<R> {
    repo: Arc<R>,
    labels: LabelResolver<R>,
}

/// Upper bound on goals in PENDING or IN_PROGRESS per owner.
pub const ACTIVE_GOAL_LIMIT: i64 = 5;

impl<R: GoalRepository + LabelRepository> GoalValidator<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            labels: LabelResolver::new(Arc::clone(&repo)),
            repo,
        }
    }

    pub async fn validate_upsert(
        &self,
        req: &crate::models::UpsertGoalData,
    ) -> Result<(), CoreError> {
        let status_id = self.labels.ensure_ref(&req.status_id, "StatusId").await?;
        self.labels
            .ensure_ref(&req.difficulty_id, "DifficultyId")
            .await?;
        self.labels
            .ensure_ref(&req.priority_id, "PriorityId")
            .await?;

        if let (Some(start_ms), Some(end_ms)) = (req.start_date, req.end_date) {
            let start = calendar::from_millis(start_ms)?;
            let end = calendar::from_millis(end_ms)?;
            if start == end {
                return Err(CoreError::validation(
                    ErrorCategory::Internal,
                    ErrorCode::ZeroDuration,
                    "goal duration cannot be zero",
                ));
            }
            if end < start {
                return Err(CoreError::validation(
                    ErrorCategory::Internal,
                    ErrorCode::EndDateBeforeStart,
                    "EndDate must be after StartDate",
                ));
            }
        }

        // The cap applies to new goals only; an existing goal already counts
        // toward it.
        let creating = req.id.as_deref().map_or(true, |id| id.is_empty());
        if creating {
            let status = self.repo.find_label_by_id(status_id).await?;
            let is_active = status
                .map(|label| label.key == keys::PENDING || label.key == keys::IN_PROGRESS)
                .unwrap_or(false);
            if is_active {
                let mut active_status_ids = Vec::with_capacity(2);
                for key in [keys::PENDING, keys::IN_PROGRESS] {
                    if let Some(label) = self.labels.try_resolve(key).await? {
                        active_status_ids.push(label.id);
                    }
                }
                let count = self
                    .repo
                    .count_goals_with_status(&req.owner_id, &active_status_ids)
                    .await?;
                if count >= ACTIVE_GOAL_LIMIT {
                    return Err(CoreError::validation(
                        ErrorCategory::Internal,
                        ErrorCode::GoalLimitExceeded,
                        format!(
                            "you can only have up to {ACTIVE_GOAL_LIMIT} goals with status PENDING or IN_PROGRESS"
                        ),
                    ));
                }
            }
        }

        if let Some(id) = req.id.as_deref().filter(|id| !id.is_empty()) {
            let goal_id = parse_id(
                id,
                ErrorCategory::NotFound,
                ErrorCode::GoalNotFound,
                "invalid goal Id",
            )?;
            let existing = self.repo.find_goal_by_id(goal_id).await.map_err(|err| {
                tracing::error!(error = %err, "failed to load goal for ownership check");
                CoreError::validation(
                    ErrorCategory::Database,
                    ErrorCode::GoalNotFound,
                    "error retrieving goal",
                )
            })?;
            let existing = existing.ok_or_else(|| {
                CoreError::validation(
                    ErrorCategory::NotFound,
                    ErrorCode::GoalNotFound,
                    "goal not found",
                )
            })?;
            if existing.owner_id != req.owner_id {
                return Err(CoreError::validation(
                    ErrorCategory::PermissionDenied,
                    ErrorCode::GoalForbidden,
                    "user does not have permission to modify this goal",
                ));
            }
        }

        Ok(())
    }
}
