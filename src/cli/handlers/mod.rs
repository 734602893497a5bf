// src/cli/handlers/mod.rs

// One module per command; shared helpers live in `commons`.

pub mod commons;
pub mod config;
pub mod last;
pub mod open;
pub mod products;
pub mod projects;
pub mod shell;
