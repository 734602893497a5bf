//! Discovery of installed JetBrains IDEs and their recent-project history.
//!
//! The library scans installation roots for `product-info.json` metadata,
//! parses each product's `recentProjects.xml`, and reconciles the two so a
//! front end can list projects and launch them with the right IDE build.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Cooperative cancellation flag shared between a query and whoever supersedes it.
pub type CancellationToken = Arc<AtomicBool>;

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
