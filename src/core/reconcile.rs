// src/core/reconcile.rs

//! # Reconciliation
//!
//! Joins recent-project records with installed-product records, and resolves
//! the launcher for a product code, preferring JetBrains Toolbox shell
//! scripts over the product's own platform launcher.
//!
//! A project matches a product when both carry the same product code and the
//! project's build string (`IU-252.23892.409`) contains the product's build
//! number (`252.23892.409`).

use crate::constants::{CACHE_TTL, MAX_SHELL_SCRIPT_SUFFIX, SHELL_SCRIPT_EXTENSIONS};
use crate::core::cache::TimedCache;
use crate::core::catalog::ProductCatalog;
use crate::core::paths;
use crate::models::{LaunchableProject, MatchPolicy, ProductRecord, ProjectRecord};
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pairs every project with the installed builds able to open it.
///
/// Products are grouped by upper-cased product code and ordered by build
/// number, newest first; repeated build numbers within a group keep only the
/// first record. With [`MatchPolicy::All`] a project produces one item per
/// build number its build string contains; with [`MatchPolicy::Best`] only
/// the longest such build number is used. Projects without a match are left
/// out.
pub fn merge_projects_and_products(
    projects: &[ProjectRecord],
    products: &[ProductRecord],
    policy: MatchPolicy,
) -> Vec<LaunchableProject> {
    let groups = group_products_by_code(products);
    let mut merged = Vec::new();

    for project in projects {
        let Some(group) = groups.get(&project.product_code.to_uppercase()) else {
            log::trace!(
                "No installed product for code '{}' ({})",
                project.product_code,
                project.path_key
            );
            continue;
        };

        let mut candidates = group
            .iter()
            .filter(|product| project.build_string.contains(product.build_number.as_str()));

        match policy {
            MatchPolicy::All => {
                merged.extend(candidates.map(|product| LaunchableProject {
                    project: project.clone(),
                    product: (*product).clone(),
                }));
            }
            MatchPolicy::Best => {
                let first = candidates.next();
                let best = candidates.fold(first, |best, candidate| match best {
                    Some(current) if candidate.build_number.len() > current.build_number.len() => {
                        Some(candidate)
                    }
                    Some(current) => Some(current),
                    None => Some(candidate),
                });
                if let Some(product) = best {
                    merged.push(LaunchableProject {
                        project: project.clone(),
                        product: (*product).clone(),
                    });
                }
            }
        }
    }

    merged
}

fn group_products_by_code(products: &[ProductRecord]) -> HashMap<String, Vec<&ProductRecord>> {
    let mut groups: HashMap<String, Vec<&ProductRecord>> = HashMap::new();
    for product in products {
        if product.product_code.is_empty() || product.build_number.is_empty() {
            continue;
        }
        groups
            .entry(product.product_code.to_uppercase())
            .or_default()
            .push(product);
    }

    for group in groups.values_mut() {
        group.sort_by(|a, b| compare_build_numbers(&b.build_number, &a.build_number));
        group.dedup_by(|a, b| a.build_number == b.build_number);
    }
    groups
}

/// Orders dotted build numbers component by component, numerically where
/// both components are integers (`252.9` < `252.10`).
pub fn compare_build_numbers(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

// --- Shell scripts ---

/// Base name of the Toolbox shell script for a product code.
pub fn shell_base_name(product_code: &str) -> Option<&'static str> {
    match product_code.to_uppercase().as_str() {
        "IC" => Some("idea"),
        "IE" | "IU" => Some("ideaiu"),
        "PS" => Some("PhpStorm"),
        "WS" => Some("webstorm"),
        "PY" | "PC" | "PE" => Some("pycharm"),
        "RM" => Some("rubymine"),
        "OC" => Some("appcode"),
        "CL" => Some("clion"),
        "GO" => Some("goland"),
        "DB" => Some("datagrip"),
        "RD" => Some("rider"),
        "AI" => Some("studio64"),
        "RR" => Some("rustrover"),
        _ => None,
    }
}

/// Finds `<base><n><ext>` in `scripts_dir` with the largest `n` (no suffix
/// counts as 0). Among equal suffixes `.cmd` beats `.bat`, which beats no
/// extension.
pub fn find_best_shell_script(scripts_dir: &Path, base_name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    for (rank, ext) in SHELL_SCRIPT_EXTENSIONS.iter().enumerate() {
        for suffix in 0..=MAX_SHELL_SCRIPT_SUFFIX {
            let file_name = if suffix == 0 {
                format!("{base_name}{ext}")
            } else {
                format!("{base_name}{suffix}{ext}")
            };
            let path = scripts_dir.join(file_name);
            if path.is_file() {
                candidates.push((suffix, rank, path));
            }
        }
    }

    candidates
        .into_iter()
        .max_by_key(|(suffix, rank, _)| (*suffix, Reverse(*rank)))
        .map(|(_, _, path)| path)
}

/// Resolves launch commands per product code, caching the outcome.
#[derive(Debug)]
pub struct ShellResolver {
    resolved: TimedCache<String, Option<String>>,
}

impl Default for ShellResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellResolver {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            resolved: TimedCache::new(ttl),
        }
    }

    /// Returns the Toolbox shell script for `product_code` when `scripts_dir`
    /// has one, otherwise the platform launcher of a matching product under
    /// `install_roots`. `None` means the launch command is unavailable.
    pub fn resolve_shell_for_product_code(
        &self,
        product_code: &str,
        scripts_dir: Option<&Path>,
        install_roots: &[PathBuf],
        catalog: &ProductCatalog,
    ) -> Option<String> {
        self.resolved
            .get_or_insert_with(product_code.to_uppercase(), || {
                resolve_uncached(product_code, scripts_dir, install_roots, catalog)
            })
    }

    pub fn invalidate(&self) {
        self.resolved.clear();
    }
}

fn resolve_uncached(
    product_code: &str,
    scripts_dir: Option<&Path>,
    install_roots: &[PathBuf],
    catalog: &ProductCatalog,
) -> Option<String> {
    let script = match (scripts_dir, shell_base_name(product_code)) {
        (Some(dir), Some(base)) => find_best_shell_script(dir, base),
        _ => None,
    };
    if let Some(script) = script {
        log::debug!("Using shell script '{}' for {}", script.display(), product_code);
        return Some(paths::normalize_path(&script));
    }

    for root in install_roots {
        let Some(product) = catalog.find_product_by_code(product_code, root) else {
            continue;
        };
        let launcher = product
            .resolved_executable_path
            .clone()
            .or_else(|| catalog.resolve_executable_path(&product, root));
        if launcher.is_some() {
            return launcher;
        }
    }

    log::warn!("No launcher or shell script found for product code {}", product_code);
    None
}
