use crate::cli::ShowCommand;
use crate::commands::App;
use crate::util::format_instant;
use anyhow::Result;
use owo_colors::OwoColorize;

pub async fn show_work(app: &App, command: ShowCommand) -> Result<()> {
    let tz = app.config.tz();
    let owner = app.owner(&command.owner);

    let view = app.works().get_work(owner, &command.id).await?;

    println!("{}", view.name.bright_white().bold());
    if let Some(description) = &view.short_description {
        println!("{description}");
    }
    println!("  Start:      {}", format_instant(view.start_date, tz));
    println!("  End:        {}", format_instant(Some(view.end_date), tz));
    println!("  Status:     {}", view.status.name);
    println!("  Type:       {}", view.work_type.name);
    println!("  Difficulty: {}", view.difficulty.name);
    println!("  Priority:   {}", view.priority.name);
    println!("  Category:   {}", view.category.name);
    if let Some(goal) = &view.goal {
        println!("  Goal:       {}", goal.name);
    }
    if view.draft.is_some() {
        println!("  {}", "Draft pending confirmation".yellow());
    }
    if view.overdue.is_some() {
        println!("  {}", "Overdue".red());
    }

    if !view.sub_tasks.is_empty() {
        println!("  Subtasks:");
        for sub_task in &view.sub_tasks {
            let mark = if sub_task.is_completed { "x" } else { " " };
            println!("    [{mark}] {}", sub_task.name);
        }
    }

    Ok(())
}
