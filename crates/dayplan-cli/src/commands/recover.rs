use crate::cli::RecoverCommand;
use crate::commands::App;
use crate::util::parse_day;
use crate::views::table::recovered_table;
use anyhow::Result;
use owo_colors::OwoColorize;

pub async fn recover_day(app: &App, command: RecoverCommand) -> Result<()> {
    let tz = app.config.tz();
    let owner = app.owner(&command.owner);

    let source = parse_day(&command.source, tz)?;
    let target = parse_day(&command.target, tz)?;

    let recovered = app.recovery().recover_day(owner, source, target).await?;

    if command.json {
        println!("{}", serde_json::to_string_pretty(&recovered)?);
        return Ok(());
    }

    if recovered.is_empty() {
        println!("Nothing to recover: {} has no works.", command.source);
        return Ok(());
    }

    let conflicts = recovered.iter().filter(|item| item.is_conflict).count();
    println!(
        "Recovered {} work(s) from {} onto {} as drafts.",
        recovered.len(),
        command.source,
        command.target
    );
    println!("{}", recovered_table(&recovered, tz));
    if conflicts > 0 {
        println!(
            "{} {conflicts} draft(s) collide with the existing schedule.",
            "Warning:".yellow().bold()
        );
    }
    println!("Keep them with 'dayplan drafts commit <id>...' or drop them with 'dayplan drafts discard <id>...'.");

    Ok(())
}
