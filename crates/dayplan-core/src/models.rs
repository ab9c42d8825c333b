use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Taxonomy slot a label belongs to. Stored as its integer discriminant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[repr(i32)]
pub enum LabelKind {
    WorkType = 1,
    Status = 2,
    Difficulty = 3,
    Priority = 4,
    Category = 5,
    Draft = 6,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid label kind: {0}")]
pub struct ParseLabelKindError(String);

impl FromStr for LabelKind {
    type Err = ParseLabelKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "worktype" | "work-type" | "type" => Ok(LabelKind::WorkType),
            "status" => Ok(LabelKind::Status),
            "difficulty" => Ok(LabelKind::Difficulty),
            "priority" => Ok(LabelKind::Priority),
            "category" => Ok(LabelKind::Category),
            "draft" => Ok(LabelKind::Draft),
            _ => Err(ParseLabelKindError(s.to_string())),
        }
    }
}

impl std::fmt::Display for LabelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelKind::WorkType => write!(f, "type"),
            LabelKind::Status => write!(f, "status"),
            LabelKind::Difficulty => write!(f, "difficulty"),
            LabelKind::Priority => write!(f, "priority"),
            LabelKind::Category => write!(f, "category"),
            LabelKind::Draft => write!(f, "draft"),
        }
    }
}

/// A taxonomy value. `key` is the stable semantic identifier ("REPEATED",
/// "PENDING", ...); `id` is the storage identity works reference.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Label {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub meaning: Option<String>,
    pub note: Option<String>,
    pub color: Option<String>,
    pub kind: LabelKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user-owned, time-boxed schedulable item. A work with no `start_date` is
/// unscheduled and never participates in overlap checking.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Work {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub name_normalized: String,
    pub short_description: Option<String>,
    pub detailed_description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
    pub status_id: Uuid,
    pub difficulty_id: Uuid,
    pub priority_id: Uuid,
    pub type_id: Uuid,
    pub category_id: Uuid,
    pub goal_id: Option<Uuid>,
    pub draft_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Work {
    pub fn is_draft(&self) -> bool {
        self.draft_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubTask {
    pub id: Uuid,
    pub work_id: Uuid,
    pub name: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub short_description: Option<String>,
    pub detailed_description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status_id: Uuid,
    pub difficulty_id: Uuid,
    pub priority_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which label reference of a work a single-label update addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSlot {
    WorkType,
    Status,
    Difficulty,
    Priority,
    Category,
}

impl LabelSlot {
    /// Column the slot maps to in the works table.
    pub fn column(self) -> &'static str {
        match self {
            LabelSlot::WorkType => "type_id",
            LabelSlot::Status => "status_id",
            LabelSlot::Difficulty => "difficulty_id",
            LabelSlot::Priority => "priority_id",
            LabelSlot::Category => "category_id",
        }
    }
}

impl TryFrom<i32> for LabelSlot {
    type Error = ParseLabelKindError;

    /// Wire encoding used by the label-update endpoint.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(LabelSlot::WorkType),
            2 => Ok(LabelSlot::Status),
            3 => Ok(LabelSlot::Difficulty),
            4 => Ok(LabelSlot::Priority),
            5 => Ok(LabelSlot::Category),
            other => Err(ParseLabelKindError(other.to_string())),
        }
    }
}

// ============================================================================
// Data Transfer Objects (wire shape of create/update requests)
// ============================================================================

/// Create/update payload for a work. Identifiers arrive as strings and
/// instants as milliseconds since epoch; presence of `id` implies update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertWorkData {
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub short_description: Option<String>,
    pub detailed_description: Option<String>,
    /// Milliseconds since epoch; absent for unscheduled works.
    pub start_date: Option<i64>,
    /// Milliseconds since epoch; mandatory.
    pub end_date: i64,
    pub type_id: String,
    pub status_id: String,
    pub difficulty_id: String,
    pub priority_id: String,
    pub category_id: String,
    pub goal_id: Option<String>,
    /// First calendar day of the repeat window (ms since epoch).
    pub repeat_first_day: Option<i64>,
    /// Last calendar day of the repeat window (ms since epoch), inclusive.
    pub repeat_last_day: Option<i64>,
    pub sub_tasks: Vec<SubTaskData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubTaskData {
    pub id: Option<String>,
    pub name: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertGoalData {
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub short_description: Option<String>,
    pub detailed_description: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub status_id: String,
    pub difficulty_id: String,
    pub priority_id: String,
}

/// Listing filters for works. The date window applies to `start_date`.
#[derive(Debug, Clone, Default)]
pub struct WorkQuery {
    pub owner_id: String,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub search: Option<String>,
    pub status_id: Option<String>,
    pub difficulty_id: Option<String>,
    pub priority_id: Option<String>,
    pub type_id: Option<String>,
    pub category_id: Option<String>,
}

// ============================================================================
// Views (resolved-label projections returned to callers)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GoalRef {
    pub id: Uuid,
    pub name: String,
}

/// A work with its label references resolved for display. `overdue` is a
/// decoration attached at read time, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct WorkView {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub short_description: Option<String>,
    pub detailed_description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
    pub status: Label,
    pub difficulty: Label,
    pub priority: Label,
    pub work_type: Label,
    pub category: Label,
    pub goal: Option<GoalRef>,
    pub draft: Option<Label>,
    pub overdue: Option<Label>,
    pub sub_tasks: Vec<SubTask>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalView {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub short_description: Option<String>,
    pub detailed_description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Label,
    pub difficulty: Label,
    pub priority: Label,
    pub overdue: Option<Label>,
}

/// One item of a day-recovery response: the persisted draft clone and
/// whether its shifted interval collides with the target day's schedule.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveredWork {
    pub work: WorkView,
    pub is_conflict: bool,
}

/// Result of a successful work upsert.
#[derive(Debug, Clone, Copy)]
pub struct UpsertOutcome {
    pub work_id: Uuid,
    pub created: bool,
}
