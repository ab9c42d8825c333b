use crate::cli::DeleteCommand;
use crate::commands::App;
use anyhow::Result;
use dialoguer::Confirm;

pub async fn delete_work(app: &App, command: DeleteCommand) -> Result<()> {
    let owner = app.owner(&command.owner);
    let view = app.works().get_work(owner, &command.id).await?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!("Are you sure you want to delete work '{}'?", view.name))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    app.works().delete_work(owner, &command.id).await?;
    println!("Deleted work '{}'.", view.name);
    Ok(())
}
