use clap::Parser;
use commands::App;
use dayplan_core::db;
use dayplan_core::error::CoreError;
use owo_colors::{OwoColorize, Style};
use std::sync::Arc;

mod cli;
mod commands;
mod config;
mod util;
mod views;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::Config::new().unwrap_or_default();

    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let repo = Arc::new(dayplan_core::repository::SqliteRepository::new(db_pool));

    let app = App {
        repo: Arc::clone(&repo),
        config,
    };

    // Idempotent: inserts the default taxonomy only on first run
    if let Err(e) = app.labels().seed().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    let cli = cli::Cli::parse();

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_work(&app, command).await,
        cli::Commands::List(command) => commands::list::list_works(&app, command).await,
        cli::Commands::Show(command) => commands::show::show_work(&app, command).await,
        cli::Commands::Delete(command) => commands::delete::delete_work(&app, command).await,
        cli::Commands::Relabel(command) => commands::relabel::relabel_work(&app, command).await,
        cli::Commands::Recover(command) => commands::recover::recover_day(&app, command).await,
        cli::Commands::Drafts(command) => {
            commands::drafts::drafts_command(&app, command.command).await
        }
        cli::Commands::Labels(command) => commands::labels::labels_command(&app, command).await,
        cli::Commands::Goal(command) => commands::goal::goal_command(&app, command.command).await,
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    let core_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<CoreError>());

    if let Some(core_error) = core_error {
        match core_error {
            CoreError::Validation(ve) => {
                eprintln!(
                    "{} {} {}",
                    "Error:".style(error_style),
                    ve.message,
                    format!("(code {})", ve.code.as_i32()).bright_black()
                );
            }
            CoreError::NotFound(s) => {
                eprintln!("{} {} not found", "Error:".style(error_style), s);
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
