//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `phish_track` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use phish_track::app::{cancel_on_ctrl_c, print_survey_statistics, render_report, render_site};
use phish_track::config::{Cli, Command};
use phish_track::initialization::init_logger_with;
use phish_track::{init_services, run_tracker, Collection, Config, Services};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = Config::from(&cli);

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let services = init_services(config).await?;
    if let Err(e) = dispatch(&services, cli.command).await {
        eprintln!("phish_track error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn dispatch(services: &Services, command: Command) -> Result<()> {
    let admin = services.admin();
    let show_pings = services.config.show_ping_count;

    match command {
        Command::Run => {
            let cancel = CancellationToken::new();
            tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
            run_tracker(services, cancel).await?;
        }
        Command::SurveyOnce => {
            let surveyor = services.surveyor();
            let summary = surveyor.survey_pass(&CancellationToken::new()).await?;
            print_survey_statistics(surveyor.stats());
            println!(
                "Probed {} site{}, skipped {}, {} declared down",
                summary.probed,
                if summary.probed == 1 { "" } else { "s" },
                summary.skipped,
                summary.stopped
            );
        }
        Command::Add {
            label,
            url,
            start_time,
        } => {
            let site = admin.add_site(&label, &url, start_time.as_deref()).await?;
            println!("Tracking {} as {}", site.url(), site.unique_id());
        }
        Command::Archive { id } => {
            let site = admin.archive_site(&id).await?;
            println!("Archived {}", site.unique_id());
        }
        Command::Unarchive { id } => {
            let site = admin.unarchive_site(&id).await?;
            println!("Restored {}", site.unique_id());
        }
        Command::Reactivate { id } => {
            let site = admin.reactivate_site(&id).await?;
            print!("{}", render_site(&site, show_pings, Utc::now()));
        }
        Command::Remove { id } => {
            admin.remove_site(&id).await?;
            println!("Removed {}", id);
        }
        Command::ClearProfile { id } => {
            let site = admin.clear_content_profile(&id).await?;
            println!("Cleared content profile of {}", site.unique_id());
        }
        Command::List { archived } => {
            let collection = if archived {
                Collection::Archived
            } else {
                Collection::Active
            };
            let sites = admin.list(collection).await?;
            print!("{}", render_report(&sites, collection, show_pings, Utc::now()));
        }
    }
    Ok(())
}
