//! # Dayplan Core Library
//!
//! The scheduling engine of the Dayplan personal productivity service:
//! overlap-safe time-boxed works, bounded daily recurrence, and day recovery
//! with conflict flagging.
//!
//! ## Features
//!
//! - **Overlap prevention**: half-open interval checks against the persisted
//!   schedule, with self-exclusion for edits
//! - **Daily recurrence**: a fixed daily-repeat pattern bounded by a repeat
//!   window, expanded lazily and checked with a single prefetch
//! - **Day recovery**: clone an entire day's works onto another date with a
//!   uniform shift, tagged as drafts and flagged for conflicts
//! - **Label taxonomy**: seeded status/difficulty/priority/category/type
//!   labels resolved from stable keys
//! - **Typed rejections**: every rejected write carries a stable
//!   `{category, code}` pair the RPC layer can map to wire errors
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer with Repository pattern
//! - [`calendar`]: Day-boundary and instant arithmetic
//! - [`overlap`]: Interval algebra and overlap detection
//! - [`recurrence`]: Repeat-window expansion and conflict checking
//! - [`validation`]: Work and goal validators
//! - [`works`], [`goals`], [`labels`]: CRUD orchestration services
//! - [`recovery`]: Day-recovery orchestrator with draft commit/discard
//! - [`error`]: Error types with stable reason codes
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use dayplan_core::{
//!     db,
//!     labels::LabelService,
//!     models::UpsertWorkData,
//!     repository::SqliteRepository,
//!     works::WorkService,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("dayplan.db").await?;
//!     let repo = Arc::new(SqliteRepository::new(pool));
//!
//!     // Seed the label taxonomy once
//!     LabelService::new(Arc::clone(&repo)).seed().await?;
//!
//!     let works = WorkService::new(Arc::clone(&repo));
//!     let outcome = works
//!         .upsert_work(&UpsertWorkData {
//!             owner_id: "user-1".into(),
//!             name: "Morning gym".into(),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("created work {}", outcome.work_id);
//!
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod db;
pub mod error;
pub mod goals;
pub mod labels;
pub mod models;
pub mod overlap;
pub mod recovery;
pub mod recurrence;
pub mod repository;
pub mod validation;
pub mod works;
