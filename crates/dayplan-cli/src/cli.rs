use clap::{Parser, Subcommand};

/// Personal schedule manager: overlap-safe works, daily recurrence and day
/// recovery
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new work (or update one with --id)
    Add(AddCommand),
    /// List works
    List(ListCommand),
    /// Show a single work with its subtasks
    Show(ShowCommand),
    /// Delete a work
    Delete(DeleteCommand),
    /// Re-point one label of a work
    Relabel(RelabelCommand),
    /// Clone a day's works onto another date as drafts
    Recover(RecoverCommand),
    /// Commit or discard recovery drafts
    Drafts(DraftsCommand),
    /// Inspect the label taxonomy
    Labels(LabelsCommand),
    /// Manage goals
    Goal(GoalCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The name of the work
    pub name: String,
    /// Update this work instead of creating a new one
    #[clap(long)]
    pub id: Option<String>,
    /// Owner of the work (defaults to the configured owner)
    #[clap(long)]
    pub owner: Option<String>,
    /// Short description
    #[clap(short, long)]
    pub description: Option<String>,
    /// Start instant ('2025-06-10 08:00' in your timezone, or RFC 3339)
    #[clap(short, long)]
    pub start: Option<String>,
    /// End instant (same formats as --start)
    #[clap(short, long)]
    pub end: String,
    /// Work type label key
    #[clap(long, default_value = "DAILY")]
    pub work_type: String,
    /// Status label key
    #[clap(long, default_value = "PENDING")]
    pub status: String,
    /// Difficulty label key
    #[clap(long, default_value = "MEDIUM")]
    pub difficulty: String,
    /// Priority label key
    #[clap(long, default_value = "IMPORTANT_NOT_URGENT")]
    pub priority: String,
    /// Category label key
    #[clap(long, default_value = "PERSONAL")]
    pub category: String,
    /// Goal id to attach
    #[clap(long)]
    pub goal: Option<String>,
    /// First day of the repeat window (YYYY-MM-DD, requires type REPEATED)
    #[clap(long)]
    pub repeat_from: Option<String>,
    /// Last day of the repeat window (YYYY-MM-DD, inclusive)
    #[clap(long)]
    pub repeat_to: Option<String>,
    /// Subtask names
    #[clap(long, num_args = 1..)]
    pub subtask: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Owner whose works to list
    #[clap(long)]
    pub owner: Option<String>,
    /// Only works starting on or after this day (YYYY-MM-DD)
    #[clap(long)]
    pub from: Option<String>,
    /// Only works starting on or before this day (YYYY-MM-DD)
    #[clap(long)]
    pub to: Option<String>,
    /// Substring search on the name (accent-insensitive)
    #[clap(long)]
    pub search: Option<String>,
    /// Print the result as JSON instead of a table
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// The ID of the work to show
    pub id: String,
    #[clap(long)]
    pub owner: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the work to delete
    pub id: String,
    #[clap(long)]
    pub owner: Option<String>,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RelabelCommand {
    /// The ID of the work
    pub id: String,
    /// Which label to change (type|status|difficulty|priority|category)
    pub slot: String,
    /// New label key (e.g. COMPLETED)
    pub key: String,
    #[clap(long)]
    pub owner: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RecoverCommand {
    /// The day to copy from (YYYY-MM-DD)
    pub source: String,
    /// The day to rebuild (YYYY-MM-DD)
    pub target: String,
    #[clap(long)]
    pub owner: Option<String>,
    /// Print the result as JSON instead of a table
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DraftsCommand {
    #[command(subcommand)]
    pub command: DraftsSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DraftsSubcommand {
    /// Keep recovered drafts: clear their draft tag
    Commit(DraftIdsCommand),
    /// Throw recovered drafts away
    Discard(DraftIdsCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct DraftIdsCommand {
    /// Draft work IDs
    #[clap(required = true, num_args = 1..)]
    pub ids: Vec<String>,
    #[clap(long)]
    pub owner: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct LabelsCommand {
    /// Restrict to one taxonomy slot (type|status|difficulty|priority|category|draft)
    #[clap(long)]
    pub kind: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct GoalCommand {
    #[command(subcommand)]
    pub command: GoalSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GoalSubcommand {
    /// Add a new goal
    Add(AddGoalCommand),
    /// List goals
    List(ListGoalsCommand),
    /// Delete a goal
    Delete(DeleteGoalCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddGoalCommand {
    /// The name of the goal
    pub name: String,
    #[clap(long)]
    pub owner: Option<String>,
    #[clap(short, long)]
    pub description: Option<String>,
    /// Start day (YYYY-MM-DD)
    #[clap(long)]
    pub start: Option<String>,
    /// End day (YYYY-MM-DD)
    #[clap(long)]
    pub end: Option<String>,
    #[clap(long, default_value = "PENDING")]
    pub status: String,
    #[clap(long, default_value = "MEDIUM")]
    pub difficulty: String,
    #[clap(long, default_value = "IMPORTANT_NOT_URGENT")]
    pub priority: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ListGoalsCommand {
    #[clap(long)]
    pub owner: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteGoalCommand {
    /// The ID of the goal to delete
    pub id: String,
    #[clap(long)]
    pub owner: Option<String>,
}
