use crate::cli::{AddGoalCommand, DeleteGoalCommand, GoalSubcommand, ListGoalsCommand};
use crate::commands::App;
use crate::util::parse_day;
use crate::views::table::goals_table;
use anyhow::Result;
use dayplan_core::models::UpsertGoalData;
use owo_colors::OwoColorize;

pub async fn goal_command(app: &App, command: GoalSubcommand) -> Result<()> {
    match command {
        GoalSubcommand::Add(command) => add_goal(app, command).await,
        GoalSubcommand::List(command) => list_goals(app, command).await,
        GoalSubcommand::Delete(command) => delete_goal(app, command).await,
    }
}

async fn add_goal(app: &App, command: AddGoalCommand) -> Result<()> {
    let tz = app.config.tz();
    let owner = app.owner(&command.owner).to_string();
    let resolver = app.resolver();

    let status = resolver.resolve(&command.status.to_uppercase()).await?;
    let difficulty = resolver.resolve(&command.difficulty.to_uppercase()).await?;
    let priority = resolver.resolve(&command.priority.to_uppercase()).await?;

    let payload = UpsertGoalData {
        id: None,
        owner_id: owner,
        name: command.name.clone(),
        short_description: command.description,
        detailed_description: None,
        start_date: command
            .start
            .as_deref()
            .map(|d| parse_day(d, tz))
            .transpose()?,
        end_date: command
            .end
            .as_deref()
            .map(|d| parse_day(d, tz))
            .transpose()?,
        status_id: status.id.to_string(),
        difficulty_id: difficulty.id.to_string(),
        priority_id: priority.id.to_string(),
    };

    let goal_id = app.goals().upsert_goal(&payload).await?;
    println!("✓ Created goal: {}", command.name.bright_white().bold());
    println!("  Goal ID: {}", goal_id.to_string().yellow());
    Ok(())
}

async fn list_goals(app: &App, command: ListGoalsCommand) -> Result<()> {
    let goals = app.goals().list_goals(app.owner(&command.owner)).await?;
    if goals.is_empty() {
        println!("No goals found.");
        return Ok(());
    }
    println!("{}", goals_table(&goals, app.config.tz()));
    Ok(())
}

async fn delete_goal(app: &App, command: DeleteGoalCommand) -> Result<()> {
    app.goals()
        .delete_goal(app.owner(&command.owner), &command.id)
        .await?;
    println!("Deleted goal {}.", command.id);
    Ok(())
}
