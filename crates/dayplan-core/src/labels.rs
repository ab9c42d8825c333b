//! Well-known label keys, the seeded taxonomy catalog, and the resolver used
//! by validation and recovery to turn semantic keys into stored label records.

use crate::error::{CoreError, ErrorCategory, ErrorCode};
use crate::models::{Label, LabelKind};
use crate::repository::LabelRepository;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Stable semantic keys. These are the identifiers the engine reasons about;
/// display names and colors are presentation data.
pub mod keys {
    // Work type
    pub const REPEATED: &str = "REPEATED";
    pub const DAILY: &str = "DAILY";
    pub const GROUP: &str = "GROUP";

    // Status
    pub const PENDING: &str = "PENDING";
    pub const IN_PROGRESS: &str = "IN_PROGRESS";
    pub const COMPLETED: &str = "COMPLETED";
    pub const OVER_DUE: &str = "OVER_DUE";
    pub const GIVE_UP: &str = "GIVE_UP";

    // Difficulty
    pub const EASY: &str = "EASY";
    pub const MEDIUM: &str = "MEDIUM";
    pub const HARD: &str = "HARD";

    // Priority
    pub const IMPORTANT_URGENT: &str = "IMPORTANT_URGENT";
    pub const IMPORTANT_NOT_URGENT: &str = "IMPORTANT_NOT_URGENT";
    pub const NOT_IMPORTANT_URGENT: &str = "NOT_IMPORTANT_URGENT";
    pub const NOT_IMPORTANT_NOT_URGENT: &str = "NOT_IMPORTANT_NOT_URGENT";

    // Category
    pub const CATEGORY_WORK: &str = "WORK";
    pub const CATEGORY_PERSONAL: &str = "PERSONAL";
    pub const CATEGORY_STUDY: &str = "STUDY";
    pub const CATEGORY_FAMILY: &str = "FAMILY";
    pub const CATEGORY_FINANCE: &str = "FINANCE";
    pub const CATEGORY_HEALTH: &str = "HEALTH";
    pub const CATEGORY_SOCIAL: &str = "SOCIAL";
    pub const CATEGORY_TRAVEL: &str = "TRAVEL";

    // Draft marker
    pub const DRAFT: &str = "DRAFT";
}

fn label(key: &str, name: &str, meaning: &str, color: &str, kind: LabelKind) -> Label {
    let now = Utc::now();
    Label {
        id: Uuid::now_v7(),
        key: key.to_string(),
        name: name.to_string(),
        meaning: Some(meaning.to_string()),
        note: None,
        color: Some(color.to_string()),
        kind,
        created_at: now,
        updated_at: now,
    }
}

/// The full default taxonomy, one label per well-known key.
pub fn default_catalog() -> Vec<Label> {
    use LabelKind::*;

    vec![
        // Work type
        label(keys::REPEATED, "Repeated", "Recurs daily over a bounded window", "#00C8FF", WorkType),
        label(keys::DAILY, "Daily", "Done within a single day", "#E8E8E8", WorkType),
        label(keys::GROUP, "Group", "Synced from a shared group schedule", "#FF5EEF", WorkType),
        // Status
        label(keys::PENDING, "Pending", "Planned but not started", "#FFEA00", Status),
        label(keys::IN_PROGRESS, "In progress", "Currently being worked on", "#00C8FF", Status),
        label(keys::COMPLETED, "Completed", "Finished successfully", "#00FF00", Status),
        label(keys::OVER_DUE, "Overdue", "Past its end time but still completable today", "#FF7C7E", Status),
        label(keys::GIVE_UP, "Given up", "Expired without completion", "#ED1E02", Status),
        // Difficulty
        label(keys::EASY, "Easy", "Light effort", "#00FF00", Difficulty),
        label(keys::MEDIUM, "Medium", "Moderate effort", "#FFEA00", Difficulty),
        label(keys::HARD, "Hard", "Heavy effort", "#ED1E02", Difficulty),
        // Priority (Eisenhower quadrants)
        label(keys::IMPORTANT_URGENT, "Important & urgent", "Do first", "#ED1E02", Priority),
        label(keys::IMPORTANT_NOT_URGENT, "Important, not urgent", "Schedule", "#FFEA00", Priority),
        label(keys::NOT_IMPORTANT_URGENT, "Urgent, not important", "Delegate", "#00C8FF", Priority),
        label(keys::NOT_IMPORTANT_NOT_URGENT, "Neither", "Drop or defer", "#E8E8E8", Priority),
        // Category
        label(keys::CATEGORY_WORK, "Work", "Professional tasks", "#4B7BEC", Category),
        label(keys::CATEGORY_PERSONAL, "Personal", "Personal errands", "#A55EEA", Category),
        label(keys::CATEGORY_STUDY, "Study", "Learning and coursework", "#26DE81", Category),
        label(keys::CATEGORY_FAMILY, "Family", "Family time", "#FD9644", Category),
        label(keys::CATEGORY_FINANCE, "Finance", "Money matters", "#F7B731", Category),
        label(keys::CATEGORY_HEALTH, "Health", "Exercise and wellbeing", "#FC5C65", Category),
        label(keys::CATEGORY_SOCIAL, "Social", "Friends and events", "#45AAF2", Category),
        label(keys::CATEGORY_TRAVEL, "Travel", "Trips and commuting", "#2BCBBA", Category),
        // Draft marker
        label(keys::DRAFT, "Draft", "Provisional, pending user confirmation", "#BBBBBB", Draft),
    ]
}

/// Resolves semantic keys and wire-format label references against the store.
/// Constructed with an explicit repository handle; holds no global state.
pub struct LabelResolver<R> {
    repo: Arc<R>,
}

impl<R> Clone for LabelResolver<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: LabelRepository> LabelResolver<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Look up a label by well-known key, `None` when the key is not seeded.
    pub async fn try_resolve(&self, key: &str) -> Result<Option<Label>, CoreError> {
        self.repo.find_label_by_key(key).await
    }

    /// Look up a label by well-known key; absence is a validation failure.
    pub async fn resolve(&self, key: &str) -> Result<Label, CoreError> {
        self.try_resolve(key).await?.ok_or_else(|| {
            CoreError::validation(
                ErrorCategory::NotFound,
                ErrorCode::LabelNotFound,
                format!("label {key} not found"),
            )
        })
    }

    /// Check a wire-format label reference: well-formed and existing.
    /// `field` names the reference in error messages ("StatusId", ...).
    pub async fn ensure_ref(&self, id: &str, field: &str) -> Result<Uuid, CoreError> {
        let label_id = Uuid::from_str(id).map_err(|_| {
            CoreError::validation(
                ErrorCategory::Runtime,
                ErrorCode::LabelNotFound,
                format!("invalid {field} format"),
            )
        })?;
        if !self.repo.label_exists(label_id).await? {
            return Err(CoreError::validation(
                ErrorCategory::NotFound,
                ErrorCode::LabelNotFound,
                format!("{field} {id} not found"),
            ));
        }
        Ok(label_id)
    }
}

/// Taxonomy CRUD surface: seeding plus the read queries the clients use to
/// render pickers.
pub struct LabelService<R> {
    repo: Arc<R>,
}

impl<R: LabelRepository> LabelService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Insert the default catalog once. Safe to call on every startup.
    pub async fn seed(&self) -> Result<(), CoreError> {
        let count = self.repo.count_labels().await?;
        if count > 0 {
            tracing::info!("labels already initialized, skipping seed");
            return Ok(());
        }
        let catalog = default_catalog();
        self.repo.insert_labels(&catalog).await?;
        tracing::info!(count = catalog.len(), "seeded label catalog");
        Ok(())
    }

    /// All labels grouped by taxonomy slot, in fixed slot order.
    pub async fn labels_grouped(&self) -> Result<Vec<(LabelKind, Vec<Label>)>, CoreError> {
        let all = self.repo.find_labels().await?;
        let kinds = [
            LabelKind::WorkType,
            LabelKind::Status,
            LabelKind::Difficulty,
            LabelKind::Priority,
            LabelKind::Category,
            LabelKind::Draft,
        ];
        Ok(kinds
            .into_iter()
            .map(|kind| {
                let labels = all.iter().filter(|l| l.kind == kind).cloned().collect();
                (kind, labels)
            })
            .collect())
    }

    pub async fn labels_by_kind(&self, kind: LabelKind) -> Result<Vec<Label>, CoreError> {
        self.repo.find_labels_by_kind(kind).await
    }
}
