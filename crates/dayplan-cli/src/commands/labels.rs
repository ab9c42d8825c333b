use crate::cli::LabelsCommand;
use crate::commands::App;
use crate::views::table::labels_table;
use anyhow::Result;
use dayplan_core::models::LabelKind;
use std::str::FromStr;

pub async fn labels_command(app: &App, command: LabelsCommand) -> Result<()> {
    let groups = match command.kind {
        Some(kind) => {
            let kind = LabelKind::from_str(&kind)
                .map_err(|err| anyhow::anyhow!("{err}"))?;
            vec![(kind, app.labels().labels_by_kind(kind).await?)]
        }
        None => app.labels().labels_grouped().await?,
    };

    println!("{}", labels_table(&groups));
    Ok(())
}
