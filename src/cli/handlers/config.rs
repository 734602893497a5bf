// src/cli/handlers/config.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{CancellationToken, core::paths, core::settings};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows the settings file and the locations derived from it."
)]
struct ConfigArgs {
    /// Only print the path of settings.toml.
    #[arg(long)]
    path: bool,
}

pub fn handle(args: Vec<String>, _cancellation_token: &CancellationToken) -> Result<()> {
    let config_args = ConfigArgs::try_parse_from(&args)?;
    let settings_path = paths::get_settings_path()?;

    if config_args.path {
        println!("{}", settings_path.display());
        return Ok(());
    }

    let settings = settings::load()?;
    println!("\n--- {} ---", settings_path.display().to_string().yellow());
    print!("{}", toml::to_string_pretty(&settings)?);

    println!("\n  {}:", "Install roots".blue());
    for root in settings.install_roots() {
        println!("    - {}", describe(&root));
    }
    println!("  {}:", "History roots".blue());
    for (root, layout) in settings.history_roots() {
        println!("    - {} {}", describe(&root), format!("({:?})", layout).dimmed());
    }
    if let Some(scripts) = settings.shell_scripts_dir() {
        println!("  {}: {}", "Shell scripts".blue(), describe(&scripts));
    }
    Ok(())
}

fn describe(path: &std::path::Path) -> String {
    if path.is_dir() {
        path.display().to_string()
    } else {
        format!("{} {}", path.display(), "(missing)".red())
    }
}
