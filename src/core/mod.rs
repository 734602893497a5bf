// src/core/mod.rs

pub mod cache;
pub mod catalog;
pub mod history;
pub mod locator;
pub mod paths;
pub mod reconcile;
pub mod search;
pub mod settings;
