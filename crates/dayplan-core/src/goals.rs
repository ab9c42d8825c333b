//! Goal CRUD orchestration.

use crate::calendar;
use crate::error::{CoreError, ErrorCategory, ErrorCode};
use crate::labels::{keys, LabelResolver};
use crate::models::{Goal, GoalView, Label, UpsertGoalData};
use crate::repository::Repository;
use crate::validation::GoalValidator;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct GoalService<R> {
    repo: Arc<R>,
    labels: LabelResolver<R>,
    validator: GoalValidator<R>,
}

impl<R: Repository> GoalService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            labels: LabelResolver::new(Arc::clone(&repo)),
            validator: GoalValidator::new(Arc::clone(&repo)),
            repo,
        }
    }

    /// Create or update a goal; presence of `id` selects update.
    pub async fn upsert_goal(&self, req: &UpsertGoalData) -> Result<Uuid, CoreError> {
        self.validator.validate_upsert(req).await.map_err(|err| {
            tracing::warn!(owner_id = %req.owner_id, error = %err, "goal upsert rejected");
            err
        })?;

        let parse = |id: &str, field: &str| {
            Uuid::parse_str(id)
                .map_err(|_| CoreError::InvalidInput(format!("malformed {field}: {id}")))
        };
        let now = Utc::now();
        let goal = Goal {
            id: match req.id.as_deref().filter(|id| !id.is_empty()) {
                Some(id) => parse(id, "goal id")?,
                None => Uuid::now_v7(),
            },
            owner_id: req.owner_id.clone(),
            name: req.name.clone(),
            short_description: req.short_description.clone(),
            detailed_description: req.detailed_description.clone(),
            start_date: req.start_date.map(calendar::from_millis).transpose()?,
            end_date: req.end_date.map(calendar::from_millis).transpose()?,
            status_id: parse(&req.status_id, "status id")?,
            difficulty_id: parse(&req.difficulty_id, "difficulty id")?,
            priority_id: parse(&req.priority_id, "priority id")?,
            created_at: now,
            updated_at: now,
        };

        let creating = req.id.as_deref().map_or(true, |id| id.is_empty());
        if creating {
            self.repo.create_goal(&goal).await.map_err(|err| {
                tracing::error!(error = %err, "failed to create goal");
                err
            })?;
        } else {
            self.repo.update_goal(&goal).await.map_err(|err| {
                tracing::error!(goal_id = %goal.id, error = %err, "failed to update goal");
                err
            })?;
        }
        Ok(goal.id)
    }

    /// All of an owner's goals with resolved labels, most recently updated
    /// first; past-end goals get the OVER_DUE decoration.
    pub async fn list_goals(&self, owner_id: &str) -> Result<Vec<GoalView>, CoreError> {
        let goals = self.repo.find_goals_by_owner(owner_id).await?;
        if goals.is_empty() {
            return Ok(Vec::new());
        }

        let mut label_ids: Vec<Uuid> = goals
            .iter()
            .flat_map(|g| [g.status_id, g.difficulty_id, g.priority_id])
            .collect();
        label_ids.sort_unstable();
        label_ids.dedup();
        let label_map: HashMap<Uuid, Label> = self
            .repo
            .find_labels_by_ids(&label_ids)
            .await?
            .into_iter()
            .map(|label| (label.id, label))
            .collect();
        let lookup = |id: Uuid| -> Result<Label, CoreError> {
            label_map
                .get(&id)
                .cloned()
                .ok_or_else(|| CoreError::NotFound(format!("label {id}")))
        };

        let overdue_label = self.labels.try_resolve(keys::OVER_DUE).await?;
        let now = Utc::now();

        goals
            .into_iter()
            .map(|goal| {
                let overdue = overdue_label
                    .clone()
                    .filter(|_| goal.end_date.map_or(false, |end| end < now));
                Ok(GoalView {
                    id: goal.id,
                    owner_id: goal.owner_id,
                    name: goal.name,
                    short_description: goal.short_description,
                    detailed_description: goal.detailed_description,
                    start_date: goal.start_date,
                    end_date: goal.end_date,
                    status: lookup(goal.status_id)?,
                    difficulty: lookup(goal.difficulty_id)?,
                    priority: lookup(goal.priority_id)?,
                    overdue,
                })
            })
            .collect()
    }

    /// Delete an owned goal, detaching it from any works that reference it.
    pub async fn delete_goal(&self, owner_id: &str, goal_id: &str) -> Result<(), CoreError> {
        let id = Uuid::parse_str(goal_id).map_err(|_| {
            CoreError::validation(
                ErrorCategory::NotFound,
                ErrorCode::GoalNotFound,
                "invalid goal Id",
            )
        })?;
        let goal = self.repo.find_goal_by_id(id).await?.ok_or_else(|| {
            CoreError::validation(
                ErrorCategory::NotFound,
                ErrorCode::GoalNotFound,
                "goal not found",
            )
        })?;
        if goal.owner_id != owner_id {
            return Err(CoreError::validation(
                ErrorCategory::PermissionDenied,
                ErrorCode::GoalForbidden,
                "user does not own this goal",
            ));
        }
        self.repo.detach_goal_from_works(id).await?;
        self.repo.delete_goal(id).await?;
        Ok(())
    }
}
