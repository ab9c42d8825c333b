use crate::cli::RelabelCommand;
use crate::commands::App;
use anyhow::{anyhow, Result};
use dayplan_core::models::LabelSlot;

pub async fn relabel_work(app: &App, command: RelabelCommand) -> Result<()> {
    let owner = app.owner(&command.owner);

    let slot = match command.slot.to_lowercase().as_str() {
        "type" => LabelSlot::WorkType,
        "status" => LabelSlot::Status,
        "difficulty" => LabelSlot::Difficulty,
        "priority" => LabelSlot::Priority,
        "category" => LabelSlot::Category,
        other => {
            return Err(anyhow!(
                "unknown label slot '{other}': use type, status, difficulty, priority or category"
            ))
        }
    };

    let label = app.resolver().resolve(&command.key.to_uppercase()).await?;
    app.works()
        .update_work_label(owner, &command.id, slot, &label.id.to_string())
        .await?;

    println!("Set {} of {} to '{}'.", command.slot, command.id, label.name);
    Ok(())
}
