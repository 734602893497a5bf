// src/cli/handlers/last.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use crate::{CancellationToken, cli::handlers::commons};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows the last opened project and last project location of every IDE."
)]
struct LastArgs {}

pub fn handle(args: Vec<String>, _cancellation_token: &CancellationToken) -> Result<()> {
    let _last_args = LastArgs::try_parse_from(&args)?;
    let service = commons::load_service()?;
    let last = service.last_opened();

    if last.is_empty() {
        println!("{}", "No IDE history files found.".yellow());
        return Ok(());
    }

    let roots: Vec<PathBuf> = service
        .settings()
        .history_roots()
        .into_iter()
        .map(|(root, _)| root)
        .collect();

    for entry in &last {
        // The product config directory is the child of a history root.
        let ide = entry
            .history_file
            .ancestors()
            .find(|dir| dir.parent().is_some_and(|p| roots.iter().any(|r| r == p)))
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.history_file.display().to_string());

        println!("\n--- {} ---", ide.yellow());
        println!(
            "  {:<18} {}",
            "Last opened".blue(),
            entry.last_opened_project.as_deref().unwrap_or("-")
        );
        println!(
            "  {:<18} {}",
            "Project location".blue(),
            entry.last_project_location.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
