//! Work CRUD orchestration: validate, map, persist, project.

use crate::calendar;
use crate::error::{CoreError, ErrorCategory, ErrorCode};
use crate::labels::{keys, LabelResolver};
use crate::models::{
    GoalRef, Label, LabelSlot, SubTask, UpsertOutcome, UpsertWorkData, Work, WorkQuery, WorkView,
};
use crate::repository::{Repository, SubTaskSpec};
use crate::validation::WorkValidator;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Accent-folded, lowercased form used for substring search.
pub fn normalize_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

pub struct WorkService<R> {
    repo: Arc<R>,
    labels: LabelResolver<R>,
    validator: WorkValidator<R>,
}

impl<R: Repository> WorkService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            labels: LabelResolver::new(Arc::clone(&repo)),
            validator: WorkValidator::new(Arc::clone(&repo)),
            repo,
        }
    }

    /// Create or update a work; presence of `id` selects update. Validation
    /// runs first and rejects without touching storage; subtasks are
    /// reconciled after the work row lands.
    pub async fn upsert_work(&self, req: &UpsertWorkData) -> Result<UpsertOutcome, CoreError> {
        self.validator.validate_upsert(req).await.map_err(|err| {
            tracing::warn!(owner_id = %req.owner_id, error = %err, "work upsert rejected");
            err
        })?;

        let (mut work, sub_tasks) = map_upsert(req)?;
        let creating = work.id == Uuid::nil();

        if creating {
            work.id = Uuid::now_v7();
            self.repo.create_work(&work).await.map_err(|err| {
                tracing::error!(error = %err, "failed to create work");
                err
            })?;
        } else {
            self.repo.update_work(&work).await.map_err(|err| {
                tracing::error!(work_id = %work.id, error = %err, "failed to update work");
                err
            })?;
        }

        self.repo.sync_sub_tasks(work.id, &sub_tasks).await.map_err(|err| {
            tracing::error!(work_id = %work.id, error = %err, "work upserted but subtask sync failed");
            err
        })?;

        Ok(UpsertOutcome {
            work_id: work.id,
            created: creating,
        })
    }

    /// Ownership-checked single fetch with resolved labels and subtasks.
    pub async fn get_work(&self, owner_id: &str, work_id: &str) -> Result<WorkView, CoreError> {
        let work = self.load_owned(owner_id, work_id).await?;
        let mut views = project_views(self.repo.as_ref(), &self.labels, vec![work], true).await?;
        Ok(views.remove(0))
    }

    /// Filtered listing with resolved labels, plus the total matching count.
    pub async fn list_works(&self, query: &WorkQuery) -> Result<(Vec<WorkView>, i64), CoreError> {
        let (works, total) = self.repo.find_works(query).await?;
        let views = project_views(self.repo.as_ref(), &self.labels, works, true).await?;
        Ok((views, total))
    }

    /// Delete a work and its subtasks. Subtasks go first so a failure never
    /// leaves orphans behind a deleted work.
    pub async fn delete_work(&self, owner_id: &str, work_id: &str) -> Result<(), CoreError> {
        let work = self.load_owned(owner_id, work_id).await?;
        self.repo.delete_sub_tasks_by_work(work.id).await?;
        self.repo.delete_work(work.id).await?;
        Ok(())
    }

    /// Re-point a single label reference of an owned work.
    pub async fn update_work_label(
        &self,
        owner_id: &str,
        work_id: &str,
        slot: LabelSlot,
        label_id: &str,
    ) -> Result<(), CoreError> {
        let label_id = self.labels.ensure_ref(label_id, "LabelId").await?;
        let work = self.load_owned(owner_id, work_id).await?;
        self.repo.update_work_label(work.id, slot, label_id).await
    }

    async fn load_owned(&self, owner_id: &str, work_id: &str) -> Result<Work, CoreError> {
        let id = Uuid::parse_str(work_id).map_err(|_| {
            CoreError::validation(
                ErrorCategory::NotFound,
                ErrorCode::WorkNotFound,
                "invalid Work Id",
            )
        })?;
        let work = self.repo.find_work_by_id(id).await?.ok_or_else(|| {
            CoreError::validation(
                ErrorCategory::NotFound,
                ErrorCode::WorkNotFound,
                "work not found",
            )
        })?;
        if work.owner_id != owner_id {
            return Err(CoreError::validation(
                ErrorCategory::PermissionDenied,
                ErrorCode::WorkForbidden,
                "user does not own this work",
            ));
        }
        Ok(work)
    }
}

/// Map a validated payload onto a `Work` row plus the desired subtask set.
/// `work.id` is nil when creating.
fn map_upsert(req: &UpsertWorkData) -> Result<(Work, Vec<SubTaskSpec>), CoreError> {
    let parse = |id: &str, field: &str| {
        Uuid::parse_str(id)
            .map_err(|_| CoreError::InvalidInput(format!("malformed {field}: {id}")))
    };

    let id = match req.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => parse(id, "work id")?,
        None => Uuid::nil(),
    };
    let goal_id = match req.goal_id.as_deref().filter(|g| !g.is_empty()) {
        Some(goal_id) => Some(parse(goal_id, "goal id")?),
        None => None,
    };
    let start_date = req.start_date.map(calendar::from_millis).transpose()?;
    let end_date = calendar::from_millis(req.end_date)?;

    let now = Utc::now();
    let work = Work {
        id,
        owner_id: req.owner_id.clone(),
        name: req.name.clone(),
        name_normalized: normalize_name(&req.name),
        short_description: req.short_description.clone(),
        detailed_description: req.detailed_description.clone(),
        start_date,
        end_date,
        status_id: parse(&req.status_id, "status id")?,
        difficulty_id: parse(&req.difficulty_id, "difficulty id")?,
        priority_id: parse(&req.priority_id, "priority id")?,
        type_id: parse(&req.type_id, "type id")?,
        category_id: parse(&req.category_id, "category id")?,
        goal_id,
        draft_id: None,
        created_at: now,
        updated_at: now,
    };

    let sub_tasks = req
        .sub_tasks
        .iter()
        .map(|spec| {
            let id = match spec.id.as_deref().filter(|id| !id.is_empty()) {
                Some(id) => Some(parse(id, "subtask id")?),
                None => None,
            };
            Ok(SubTaskSpec {
                id,
                name: spec.name.clone(),
                is_completed: spec.is_completed,
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    Ok((work, sub_tasks))
}

/// Resolve label references, goal names and subtasks for a batch of works,
/// preserving input order. With `decorate_overdue`, works whose end has
/// passed get the OVER_DUE label attached to the view.
pub(crate) async fn project_views<R: Repository>(
    repo: &R,
    labels: &LabelResolver<R>,
    works: Vec<Work>,
    decorate_overdue: bool,
) -> Result<Vec<WorkView>, CoreError> {
    if works.is_empty() {
        return Ok(Vec::new());
    }

    let mut label_ids: Vec<Uuid> = Vec::new();
    for work in &works {
        label_ids.extend([
            work.status_id,
            work.difficulty_id,
            work.priority_id,
            work.type_id,
            work.category_id,
        ]);
        label_ids.extend(work.draft_id);
    }
    label_ids.sort_unstable();
    label_ids.dedup();

    let label_map: HashMap<Uuid, Label> = repo
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

    let work_ids: Vec<Uuid> = works.iter().map(|w| w.id).collect();
    let mut sub_tasks_by_work: HashMap<Uuid, Vec<SubTask>> = HashMap::new();
    for sub_task in repo.find_sub_tasks_by_works(&work_ids).await? {
        sub_tasks_by_work
            .entry(sub_task.work_id)
            .or_default()
            .push(sub_task);
    }

    let mut goal_names: HashMap<Uuid, String> = HashMap::new();
    for work in &works {
        if let Some(goal_id) = work.goal_id {
            if !goal_names.contains_key(&goal_id) {
                if let Some(goal) = repo.find_goal_by_id(goal_id).await? {
                    goal_names.insert(goal_id, goal.name);
                }
            }
        }
    }

    let overdue_label = if decorate_overdue {
        labels.try_resolve(keys::OVER_DUE).await.unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to load overdue label");
            None
        })
    } else {
        None
    };
    let now = Utc::now();

    works
        .into_iter()
        .map(|work| {
            let overdue = overdue_label.clone().filter(|_| work.end_date < now);
            Ok(WorkView {
                id: work.id,
                owner_id: work.owner_id,
                name: work.name,
                short_description: work.short_description,
                detailed_description: work.detailed_description,
                start_date: work.start_date,
                end_date: work.end_date,
                status: lookup(work.status_id)?,
                difficulty: lookup(work.difficulty_id)?,
                priority: lookup(work.priority_id)?,
                work_type: lookup(work.type_id)?,
                category: lookup(work.category_id)?,
                goal: work.goal_id.and_then(|goal_id| {
                    goal_names.get(&goal_id).map(|name| GoalRef {
                        id: goal_id,
                        name: name.clone(),
                    })
                }),
                draft: work.draft_id.map(|id| lookup(id)).transpose()?,
                overdue,
                sub_tasks: sub_tasks_by_work.remove(&work.id).unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_folds_accents() {
        assert_eq!(normalize_name("Học Tiếng Việt"), "hoc tieng viet");
        assert_eq!(normalize_name("Déjà Vu"), "deja vu");
    }

    #[test]
    fn test_normalize_name_plain_ascii() {
        assert_eq!(normalize_name("Morning Gym"), "morning gym");
    }
}
