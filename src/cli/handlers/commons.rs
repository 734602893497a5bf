// src/cli/handlers/commons.rs

// This module contains shared functions used by multiple handlers.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Select, theme::ColorfulTheme};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    core::{search::SearchService, settings},
    models::{ProductFilter, ProjectEntry},
};

/// Loads `settings.toml` and builds the service every command queries.
pub fn load_service() -> Result<SearchService> {
    let settings = settings::load().context("Could not load settings")?;
    log::debug!("Loaded settings: {:?}", settings);
    Ok(SearchService::new(settings))
}

/// `--product` value to filter: absent or `all` means every product.
pub fn product_filter(product: Option<&str>) -> ProductFilter {
    match product.map(str::trim) {
        None | Some("") => ProductFilter::AllProducts,
        Some(code) if code.eq_ignore_ascii_case("all") => ProductFilter::AllProducts,
        Some(code) => ProductFilter::ByProductCode(code.to_uppercase()),
    }
}

/// Renders an epoch-milliseconds timestamp as a coarse age ("3h ago").
pub fn format_age(epoch_millis: i64) -> String {
    if epoch_millis <= 0 {
        return "never".to_string();
    }

    let now_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default();
    let seconds = (now_millis - epoch_millis).max(0) / 1000;

    match seconds {
        0..60 => "just now".to_string(),
        60..3_600 => format!("{}m ago", seconds / 60),
        3_600..86_400 => format!("{}h ago", seconds / 3_600),
        _ => format!("{}d ago", seconds / 86_400),
    }
}

/// One line of a project listing.
pub fn format_entry(entry: &ProjectEntry) -> String {
    let project = &entry.project;
    let marker = if project.is_opened {
        "●".green().to_string()
    } else {
        " ".to_string()
    };
    let code = if project.product_code.is_empty() {
        "??".dimmed()
    } else {
        project.product_code.cyan()
    };
    let unavailable = if entry.launcher.is_none() {
        format!(" {}", "(no launcher)".red())
    } else {
        String::new()
    };

    format!(
        "{} {:<4} {:<28} {} {}{}",
        marker,
        code,
        project.display_name.bold(),
        project.path_key.dimmed(),
        format_age(project.last_activity()).dimmed(),
        unavailable
    )
}

/// Lets the user pick one of `entries`. Returns `None` if the prompt was dismissed.
pub fn select_entry_interactive(entries: &[ProjectEntry]) -> Result<Option<usize>> {
    let items: Vec<String> = entries
        .iter()
        .map(|e| format!("{} [{}] {}", e.project.display_name, e.project.product_code, e.project.path_key))
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Several projects match. Which one should be opened?")
        .items(&items)
        .default(0)
        .interact_opt()?;
    Ok(selection)
}
