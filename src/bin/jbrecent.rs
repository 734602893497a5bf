// src/bin/jbrecent.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use jbrecent::{
    CancellationToken,
    cli::{Cli, handlers},
    core::search::SearchError,
};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

// --- Command Definition and Registry ---

/// A command, its aliases, and its handler.
/// Every handler has the same signature so the registry can hold them all.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &CancellationToken) -> Result<()>,
}

/// Every command the binary understands. Add an entry here to add a command.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "config",
        aliases: &[],
        handler: handlers::config::handle,
    },
    CommandDefinition {
        name: "last",
        aliases: &[],
        handler: handlers::last::handle,
    },
    CommandDefinition {
        name: "open",
        aliases: &["o"],
        handler: handlers::open::handle,
    },
    CommandDefinition {
        name: "products",
        aliases: &["ides"],
        handler: handlers::products::handle,
    },
    CommandDefinition {
        name: "projects",
        aliases: &["ls", "list"],
        handler: handlers::projects::handle,
    },
    CommandDefinition {
        name: "shell",
        aliases: &[],
        handler: handlers::shell::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Sets up logging, dispatches to the handler and reports errors in one place.
fn main() {
    let cancellation_token = Arc::new(AtomicBool::new(false));
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse(), cancellation_token) {
        if matches!(e.downcast_ref::<SearchError>(), Some(SearchError::Cancelled)) {
            std::process::exit(130);
        }

        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// The dispatcher. `jbrecent` alone lists projects, and a first word that is
/// not a command is taken as the start of a project query.
fn run_cli(cli: Cli, cancellation_token: CancellationToken) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some(name) = cli.command else {
        return handlers::projects::handle(cli.args, &cancellation_token);
    };

    if let Some(command) = find_command(&name) {
        (command.handler)(cli.args, &cancellation_token)
    } else {
        let mut query_args = vec![name];
        query_args.extend(cli.args);
        handlers::projects::handle(query_args, &cancellation_token)
    }
}
