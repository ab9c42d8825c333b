use crate::config::Config;
use dayplan_core::goals::GoalService;
use dayplan_core::labels::{LabelResolver, LabelService};
use dayplan_core::recovery::RecoveryService;
use dayplan_core::repository::SqliteRepository;
use dayplan_core::works::WorkService;
use std::sync::Arc;

pub mod add;
pub mod delete;
pub mod drafts;
pub mod goal;
pub mod labels;
pub mod list;
pub mod recover;
pub mod relabel;
pub mod show;

/// Shared handles every command runs against.
pub struct App {
    pub repo: Arc<SqliteRepository>,
    pub config: Config,
}

impl App {
    pub fn owner<'a>(&'a self, flag: &'a Option<String>) -> &'a str {
        flag.as_deref().unwrap_or(&self.config.owner)
    }

    pub fn works(&self) -> WorkService<SqliteRepository> {
        WorkService::new(Arc::clone(&self.repo))
    }

    pub fn goals(&self) -> GoalService<SqliteRepository> {
        GoalService::new(Arc::clone(&self.repo))
    }

    pub fn recovery(&self) -> RecoveryService<SqliteRepository> {
        RecoveryService::new(Arc::clone(&self.repo))
    }

    pub fn labels(&self) -> LabelService<SqliteRepository> {
        LabelService::new(Arc::clone(&self.repo))
    }

    pub fn resolver(&self) -> LabelResolver<SqliteRepository> {
        LabelResolver::new(Arc::clone(&self.repo))
    }
}
