// src/cli/handlers/shell.rs

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::{CancellationToken, cli::handlers::commons};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Prints the launcher used for a product code: a Toolbox script or the IDE's own launcher."
)]
struct ShellArgs {
    /// Product code, e.g. IU, PS, RD.
    code: String,
}

pub fn handle(args: Vec<String>, _cancellation_token: &CancellationToken) -> Result<()> {
    let shell_args = ShellArgs::try_parse_from(&args)?;
    let service = commons::load_service()?;

    let launcher = service
        .launcher_for(&shell_args.code)
        .ok_or_else(|| anyhow!("No launcher found for product code '{}'.", shell_args.code))?;
    println!("{}", launcher);
    Ok(())
}
