use crate::cli::ListCommand;
use crate::commands::App;
use crate::views::table::works_table;
use anyhow::Result;
use dayplan_core::calendar;
use dayplan_core::models::WorkQuery;

pub async fn list_works(app: &App, command: ListCommand) -> Result<()> {
    let tz = app.config.tz();
    let owner = app.owner(&command.owner).to_string();

    let from = command
        .from
        .as_deref()
        .map(|d| calendar::local_day_bounds(d, tz).map(|(start, _)| start.timestamp_millis()))
        .transpose()?;
    // `--to` is inclusive: filter up to the last instant of that day
    let to = command
        .to
        .as_deref()
        .map(|d| calendar::local_day_bounds(d, tz).map(|(_, end)| end.timestamp_millis() - 1))
        .transpose()?;

    let query = WorkQuery {
        owner_id: owner,
        from,
        to,
        search: command.search,
        ..Default::default()
    };

    let (views, total) = app.works().list_works(&query).await?;

    if command.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No works found.");
        return Ok(());
    }

    println!("{}", works_table(&views, tz));
    println!("{total} work(s)");
    Ok(())
}
