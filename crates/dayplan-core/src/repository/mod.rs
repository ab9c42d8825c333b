use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{Goal, Label, LabelKind, LabelSlot, SubTask, Work, WorkQuery};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

// Re-export domain modules
pub mod goals;
pub mod labels;
pub mod works;

// Traits are defined in this module and implemented in respective domain modules

/// A parsed subtask from an upsert payload; `id` present means the subtask
/// already exists and is being kept.
#[derive(Debug, Clone)]
pub struct SubTaskSpec {
    pub id: Option<Uuid>,
    pub name: String,
    pub is_completed: bool,
}

/// Domain-specific trait for work operations
#[async_trait]
pub trait WorkRepository {
    async fn create_work(&self, work: &Work) -> Result<(), CoreError>;
    async fn update_work(&self, work: &Work) -> Result<(), CoreError>;
    async fn find_work_by_id(&self, id: Uuid) -> Result<Option<Work>, CoreError>;
    /// Filtered listing plus the total matching count.
    async fn find_works(&self, query: &WorkQuery) -> Result<(Vec<Work>, i64), CoreError>;
    async fn delete_work(&self, id: Uuid) -> Result<(), CoreError>;
    async fn update_work_label(
        &self,
        id: Uuid,
        slot: LabelSlot,
        label_id: Uuid,
    ) -> Result<(), CoreError>;

    /// Number of scheduled works of `owner_id` whose half-open interval
    /// intersects `[start, end)`. Unscheduled works (no start) are excluded
    /// by the query itself.
    async fn count_overlapping_works(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<i64, CoreError>;

    /// All scheduled works intersecting `[start, end)`, ordered by start.
    /// Single prefetch used by the recurrence expander and the recovery
    /// conflict baseline.
    async fn find_scheduled_works_in_range(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Work>, CoreError>;

    /// All works (scheduled or not) touching the closed range
    /// `[start, end]`; an unscheduled work belongs to the day its end falls
    /// in. Recovery's source-day fetch.
    async fn find_works_touching_range(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Work>, CoreError>;

    /// Purge draft-tagged works intersecting `[start, end]`. Subtasks go
    /// with them via cascade.
    async fn delete_drafts_in_range(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, CoreError>;

    async fn bulk_insert_works(&self, works: &[Work]) -> Result<(), CoreError>;

    /// Clear the draft tag on the given owned draft works. Returns the
    /// number of works committed.
    async fn commit_drafts(
        &self,
        owner_id: &str,
        ids: &[Uuid],
        draft_id: Uuid,
    ) -> Result<u64, CoreError>;

    /// Delete the given owned draft works outright.
    async fn delete_drafts_by_ids(
        &self,
        owner_id: &str,
        ids: &[Uuid],
        draft_id: Uuid,
    ) -> Result<u64, CoreError>;
}

/// Domain-specific trait for subtask operations
#[async_trait]
pub trait SubTaskRepository {
    async fn find_sub_tasks_by_work(&self, work_id: Uuid) -> Result<Vec<SubTask>, CoreError>;
    async fn find_sub_tasks_by_works(&self, work_ids: &[Uuid]) -> Result<Vec<SubTask>, CoreError>;
    /// Reconcile the stored subtasks of a work with the submitted set:
    /// insert new, update kept, delete removed. One transaction.
    async fn sync_sub_tasks(&self, work_id: Uuid, desired: &[SubTaskSpec])
        -> Result<(), CoreError>;
    async fn delete_sub_tasks_by_work(&self, work_id: Uuid) -> Result<(), CoreError>;
    async fn bulk_insert_sub_tasks(&self, sub_tasks: &[SubTask]) -> Result<(), CoreError>;
}

/// Domain-specific trait for label operations
#[async_trait]
pub trait LabelRepository {
    async fn count_labels(&self) -> Result<i64, CoreError>;
    async fn insert_labels(&self, labels: &[Label]) -> Result<(), CoreError>;
    async fn find_labels(&self) -> Result<Vec<Label>, CoreError>;
    async fn find_labels_by_kind(&self, kind: LabelKind) -> Result<Vec<Label>, CoreError>;
    async fn find_label_by_key(&self, key: &str) -> Result<Option<Label>, CoreError>;
    async fn find_label_by_id(&self, id: Uuid) -> Result<Option<Label>, CoreError>;
    async fn find_labels_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Label>, CoreError>;
    async fn label_exists(&self, id: Uuid) -> Result<bool, CoreError>;
}

/// Domain-specific trait for goal operations
#[async_trait]
pub trait GoalRepository {
    async fn create_goal(&self, goal: &Goal) -> Result<(), CoreError>;
    async fn update_goal(&self, goal: &Goal) -> Result<(), CoreError>;
    async fn find_goal_by_id(&self, id: Uuid) -> Result<Option<Goal>, CoreError>;
    async fn find_goals_by_owner(&self, owner_id: &str) -> Result<Vec<Goal>, CoreError>;
    async fn delete_goal(&self, id: Uuid) -> Result<(), CoreError>;
    /// Active-goal cap support: count the owner's goals carrying any of the
    /// given status labels.
    async fn count_goals_with_status(
        &self,
        owner_id: &str,
        status_ids: &[Uuid],
    ) -> Result<i64, CoreError>;
    /// Null out goal references on works before the goal is deleted.
    async fn detach_goal_from_works(&self, goal_id: Uuid) -> Result<(), CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    WorkRepository + SubTaskRepository + LabelRepository + GoalRepository + Send + Sync
{
    // Individual domain operations are defined in their respective traits
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl Repository for SqliteRepository {}
