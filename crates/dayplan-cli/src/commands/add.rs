use crate::cli::AddCommand;
use crate::commands::App;
use crate::util::{parse_day, parse_instant};
use anyhow::Result;
use dayplan_core::models::{SubTaskData, UpsertWorkData};
use owo_colors::{OwoColorize, Style};

pub async fn add_work(app: &App, command: AddCommand) -> Result<()> {
    let tz = app.config.tz();
    let owner = app.owner(&command.owner).to_string();
    let resolver = app.resolver();

    let work_type = resolver.resolve(&command.work_type.to_uppercase()).await?;
    let status = resolver.resolve(&command.status.to_uppercase()).await?;
    let difficulty = resolver.resolve(&command.difficulty.to_uppercase()).await?;
    let priority = resolver.resolve(&command.priority.to_uppercase()).await?;
    let category = resolver.resolve(&command.category.to_uppercase()).await?;

    let payload = UpsertWorkData {
        id: command.id,
        owner_id: owner,
        name: command.name,
        short_description: command.description,
        detailed_description: None,
        start_date: command
            .start
            .as_deref()
            .map(|s| parse_instant(s, tz))
            .transpose()?,
        end_date: parse_instant(&command.end, tz)?,
        type_id: work_type.id.to_string(),
        status_id: status.id.to_string(),
        difficulty_id: difficulty.id.to_string(),
        priority_id: priority.id.to_string(),
        category_id: category.id.to_string(),
        goal_id: command.goal,
        repeat_first_day: command
            .repeat_from
            .as_deref()
            .map(|d| parse_day(d, tz))
            .transpose()?,
        repeat_last_day: command
            .repeat_to
            .as_deref()
            .map(|d| parse_day(d, tz))
            .transpose()?,
        sub_tasks: command
            .subtask
            .into_iter()
            .map(|name| SubTaskData {
                id: None,
                name,
                is_completed: false,
            })
            .collect(),
    };

    let name = payload.name.clone();
    let outcome = app.works().upsert_work(&payload).await?;

    let success_style = Style::new().green().bold();
    let verb = if outcome.created { "Created" } else { "Updated" };
    println!(
        "{} {} work: {}",
        "✓".style(success_style),
        verb,
        name.bright_white().bold()
    );
    println!("  Work ID: {}", outcome.work_id.to_string().yellow());

    Ok(())
}
