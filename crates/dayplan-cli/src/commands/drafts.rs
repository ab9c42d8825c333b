use crate::cli::{DraftIdsCommand, DraftsSubcommand};
use crate::commands::App;
use anyhow::Result;

pub async fn drafts_command(app: &App, command: DraftsSubcommand) -> Result<()> {
    match command {
        DraftsSubcommand::Commit(DraftIdsCommand { ids, owner }) => {
            let committed = app
                .recovery()
                .commit_drafts(app.owner(&owner), &ids)
                .await?;
            println!("Committed {committed} draft(s).");
        }
        DraftsSubcommand::Discard(DraftIdsCommand { ids, owner }) => {
            let discarded = app
                .recovery()
                .discard_drafts(app.owner(&owner), &ids)
                .await?;
            println!("Discarded {discarded} draft(s).");
        }
    }
    Ok(())
}
