// src/cli/handlers/open.rs

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;

use crate::{
    CancellationToken,
    cli::handlers::commons,
    core::search::ProjectQuery,
    system::launcher::{self, LaunchRequest},
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Opens a recent project with the IDE that last had it open."
)]
struct OpenArgs {
    /// Text to look for in the project name, window title or path.
    #[arg(required = true)]
    query: Vec<String>,

    /// Only consider projects of this product code.
    #[arg(long, short)]
    product: Option<String>,

    /// Start the IDE with administrator rights (Windows only).
    #[arg(long)]
    admin: bool,

    /// Print the launch command instead of running it.
    #[arg(long)]
    dry_run: bool,
}

pub fn handle(args: Vec<String>, cancellation_token: &CancellationToken) -> Result<()> {
    let open_args = OpenArgs::try_parse_from(&args)?;
    let service = commons::load_service()?;

    let query = ProjectQuery::new(
        open_args.query.join(" "),
        commons::product_filter(open_args.product.as_deref()),
    );
    let matches = service.search(&query, cancellation_token)?;
    if matches.is_empty() {
        bail!("No recent project matches '{}'.", query.text);
    }

    let launchable: Vec<_> = matches.into_iter().filter(|e| e.launcher.is_some()).collect();
    let selected = match launchable.len() {
        0 => bail!(
            "Projects match '{}', but none of their IDEs has a launcher on this machine.",
            query.text
        ),
        1 => 0,
        _ => match commons::select_entry_interactive(&launchable)? {
            Some(index) => index,
            None => {
                println!("{}", "Cancelled.".dimmed());
                return Ok(());
            }
        },
    };

    let Some((entry, executable)) = launchable
        .get(selected)
        .and_then(|e| e.launcher.as_deref().map(|launcher| (e, launcher)))
    else {
        bail!("No launcher is available for the selected project.");
    };
    let elevated = open_args.admin || service.settings().run_as_administrator;
    let request = LaunchRequest::new(executable, entry.project.path_key.as_str(), elevated);

    if open_args.dry_run {
        println!("{}", request.command_line());
        return Ok(());
    }

    launcher::launch(&request)?;
    println!(
        "{} {} {}",
        "Opening".green(),
        entry.project.display_name.bold(),
        entry.project.path_key.dimmed()
    );
    Ok(())
}
