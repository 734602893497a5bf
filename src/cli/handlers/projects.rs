// src/cli/handlers/projects.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{
    CancellationToken,
    cli::handlers::commons,
    core::search::ProjectQuery,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Lists recent projects of every installed JetBrains IDE, open ones first."
)]
struct ProjectsArgs {
    /// Text to look for in the project name, window title or path.
    query: Vec<String>,

    /// Only list projects of this product code (e.g. IU, PS, RD).
    #[arg(long, short)]
    product: Option<String>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

pub fn handle(args: Vec<String>, cancellation_token: &CancellationToken) -> Result<()> {
    let projects_args = ProjectsArgs::try_parse_from(&args)?;
    let service = commons::load_service()?;

    let query = ProjectQuery::new(
        projects_args.query.join(" "),
        commons::product_filter(projects_args.product.as_deref()),
    );
    let entries = service.search(&query, cancellation_token)?;

    if projects_args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!(
            "{}",
            "No recent projects found. Check the install and config locations with `jbrecent config`."
                .yellow()
        );
        return Ok(());
    }

    println!("\n{} ({})", "Recent projects".bold(), entries.len());
    for entry in &entries {
        println!("{}", commons::format_entry(entry));
    }
    Ok(())
}
