// src/cli/handlers/products.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{CancellationToken, cli::handlers::commons, core::catalog};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists the JetBrains IDE builds installed on this machine.")]
struct ProductsArgs {
    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

pub fn handle(args: Vec<String>, _cancellation_token: &CancellationToken) -> Result<()> {
    let products_args = ProductsArgs::try_parse_from(&args)?;
    let service = commons::load_service()?;
    let mut products = service.installed_products();
    catalog::sort_by_display_name(&mut products);

    if products_args.json {
        println!("{}", serde_json::to_string_pretty(&products)?);
        return Ok(());
    }

    if products.is_empty() {
        let roots: Vec<String> = service
            .settings()
            .install_roots()
            .iter()
            .map(|r| r.display().to_string())
            .collect();
        println!(
            "{} {}",
            "No installed products found under:".yellow(),
            roots.join(", ")
        );
        return Ok(());
    }

    for product in &products {
        println!(
            "\n--- {} {} ({}) ---",
            catalog::product_display_name(&product.product_code, &product.name).yellow(),
            product.version,
            product.product_code.cyan()
        );
        println!("  {:<10} {}", "Build".blue(), product.build_number);
        println!("  {:<10} {}", "Location".blue(), product.install_dir.display());
        match &product.resolved_executable_path {
            Some(exe) => println!("  {:<10} {}", "Launcher".blue(), exe),
            None => println!("  {:<10} {}", "Launcher".blue(), "not found".red()),
        }
        if let Some(icon) = &product.resolved_icon_path {
            println!("  {:<10} {}", "Icon".blue(), icon.dimmed());
        }
    }
    Ok(())
}
