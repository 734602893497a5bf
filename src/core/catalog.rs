// src/core/catalog.rs

//! # Product Catalog
//!
//! Builds the list of JetBrains products installed under an install root by
//! reading each product directory's `product-info.json`, and resolves the
//! launcher and icon paths for a product.
//!
//! Scans are cached per install root for [`CACHE_TTL`], icon lookups per
//! product code. Every filesystem or JSON failure is logged and turned into
//! "no result" for the directory concerned; a scan never aborts half way.

use crate::constants::CACHE_TTL;
use crate::core::{cache::TimedCache, locator, paths};
use crate::models::{LaunchTarget, ProductRecord};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Installed products and their resolved paths, with short-lived caching.
#[derive(Debug)]
pub struct ProductCatalog {
    products: TimedCache<PathBuf, Vec<ProductRecord>>,
    icons: TimedCache<String, String>,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            products: TimedCache::new(ttl),
            icons: TimedCache::new(ttl),
        }
    }

    /// Returns every product with a usable `product-info.json` directly under
    /// `install_root`. Empty results are cached as well, so an unconfigured
    /// root is not rescanned on every keystroke.
    pub fn get_installed_products(&self, install_root: &Path) -> Vec<ProductRecord> {
        self.products
            .get_or_insert_with(install_root.to_path_buf(), || self.scan(install_root))
    }

    /// The first installed product whose code matches, case-insensitively.
    pub fn find_product_by_code(&self, code: &str, install_root: &Path) -> Option<ProductRecord> {
        self.get_installed_products(install_root)
            .into_iter()
            .find(|p| p.product_code.eq_ignore_ascii_case(code))
    }

    /// Resolves the launcher of `product` for the running platform by looking
    /// for a directory under `install_root` whose metadata carries the same
    /// product code and that actually contains the launcher file.
    pub fn resolve_executable_path(
        &self,
        product: &ProductRecord,
        install_root: &Path,
    ) -> Option<String> {
        let Some(target) = select_launch_target(product) else {
            log::debug!(
                "Product {} has no launch target for {}.",
                product.product_code,
                current_platform_os()
            );
            return None;
        };
        if target.launcher_relative_path.is_empty() {
            return None;
        }

        let found = find_in_matching_directories(
            install_root,
            &product.product_code,
            &target.launcher_relative_path,
        );
        if found.is_none() {
            log::info!("No launcher found for product code {}", product.product_code);
        }
        found
    }

    /// Resolves the absolute SVG icon path of `product`, cached per product code.
    pub fn resolve_icon_path(&self, product: &ProductRecord, install_root: &Path) -> Option<String> {
        if product.svg_icon_relative_path.is_empty() {
            return None;
        }

        let cache_key = product.product_code.to_uppercase();
        if let Some(cached) = self.icons.try_get(&cache_key) {
            return Some(cached);
        }

        match find_in_matching_directories(
            install_root,
            &product.product_code,
            &product.svg_icon_relative_path,
        ) {
            Some(icon) => {
                self.icons.set(cache_key, icon.clone());
                Some(icon)
            }
            None => {
                log::info!("No icon found for product code {}", product.product_code);
                None
            }
        }
    }

    /// Forgets every cached scan and icon.
    pub fn invalidate(&self) {
        self.products.clear();
        self.icons.clear();
    }

    fn scan(&self, install_root: &Path) -> Vec<ProductRecord> {
        log::debug!("Scanning install root '{}'", install_root.display());

        let products: Vec<ProductRecord> = locator::find_product_directories(install_root)
            .into_iter()
            .filter_map(|dir| load_product_record(&dir))
            .map(|mut product| {
                product.resolved_executable_path = select_launch_target(&product)
                    .map(|t| product.install_dir.join(&t.launcher_relative_path))
                    .filter(|path| path.is_file())
                    .map(|path| paths::normalize_path(&path));
                product.resolved_icon_path = self.resolve_icon_path(&product, install_root);
                product
            })
            .collect();

        log::debug!(
            "Found {} product(s) under '{}'",
            products.len(),
            install_root.display()
        );
        products
    }
}

/// Parses `<product_dir>/product-info.json`. Missing or malformed metadata,
/// and metadata without a product code, yield `None`.
pub fn load_product_record(product_dir: &Path) -> Option<ProductRecord> {
    let metadata_path = locator::find_metadata_file(product_dir)?;

    let content = match fs::read_to_string(&metadata_path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("Failed to read '{}': {}", metadata_path.display(), e);
            return None;
        }
    };

    let mut product: ProductRecord = match serde_json::from_str(&content) {
        Ok(product) => product,
        Err(e) => {
            log::warn!(
                "Error parsing product-info.json in '{}': {}",
                product_dir.display(),
                e
            );
            return None;
        }
    };

    if product.product_code.trim().is_empty() {
        log::debug!(
            "Ignoring '{}': metadata has no product code.",
            metadata_path.display()
        );
        return None;
    }

    product.install_dir = product_dir.to_path_buf();
    log::trace!(
        "Loaded product info for {} (Code: {})",
        product.name,
        product.product_code
    );
    Some(product)
}

/// Whether `dir` holds metadata for `product_code`. Directory names are not
/// trusted to encode the product.
fn is_matching_product_directory(dir: &Path, product_code: &str) -> bool {
    load_product_record(dir).is_some_and(|p| p.product_code.eq_ignore_ascii_case(product_code))
}

fn find_in_matching_directories(
    install_root: &Path,
    product_code: &str,
    relative_path: &str,
) -> Option<String> {
    locator::find_product_directories(install_root)
        .into_iter()
        .filter(|dir| is_matching_product_directory(dir, product_code))
        .map(|dir| dir.join(relative_path))
        .find(|path| path.is_file())
        .map(|path| paths::normalize_path(&path))
}

/// The `os` value `product-info.json` uses for the running platform.
pub fn current_platform_os() -> &'static str {
    match std::env::consts::OS {
        "windows" => "Windows",
        "macos" => "macOS",
        "linux" => "Linux",
        other => other,
    }
}

/// Launch target for the running platform and architecture.
pub fn select_launch_target(product: &ProductRecord) -> Option<&LaunchTarget> {
    select_launch_target_for(product, current_platform_os(), std::env::consts::ARCH)
}

/// Picks the first target for `os`, preferring one built for `arch`.
pub fn select_launch_target_for<'a>(
    product: &'a ProductRecord,
    os: &str,
    arch: &str,
) -> Option<&'a LaunchTarget> {
    let aliases = arch_aliases(arch);
    let mut for_os = product
        .launch_targets
        .iter()
        .filter(|t| t.os.eq_ignore_ascii_case(os))
        .peekable();

    let first = *for_os.peek()?;
    Some(
        for_os
            .find(|t| aliases.iter().any(|a| t.arch.eq_ignore_ascii_case(a)))
            .unwrap_or(first),
    )
}

fn arch_aliases(arch: &str) -> &'static [&'static str] {
    match arch {
        "x86_64" | "amd64" => &["amd64", "x86_64", "x64"],
        "aarch64" | "arm64" => &["aarch64", "arm64"],
        "x86" => &["x86", "i386", "i686"],
        _ => &[],
    }
}

/// Marketing name for a product code, falling back to `default_name`.
pub fn product_display_name(code: &str, default_name: &str) -> String {
    let known = match code.to_uppercase().as_str() {
        "IU" => Some("IntelliJ IDEA Ultimate"),
        "IC" => Some("IntelliJ IDEA Community"),
        "IE" => Some("IntelliJ IDEA Educational"),
        "PS" => Some("PhpStorm"),
        "WS" => Some("WebStorm"),
        "PY" => Some("PyCharm Professional"),
        "PC" => Some("PyCharm Community"),
        "PE" => Some("PyCharm Educational"),
        "RM" => Some("RubyMine"),
        "OC" => Some("AppCode"),
        "CL" => Some("CLion"),
        "GO" => Some("GoLand"),
        "DB" => Some("DataGrip"),
        "RD" => Some("Rider"),
        "AI" => Some("Android Studio"),
        "RR" => Some("RustRover"),
        "QA" => Some("Aqua"),
        _ => None,
    };

    match known {
        Some(name) => name.to_string(),
        None if default_name.trim().is_empty() => "Unknown".to_string(),
        None => default_name.to_string(),
    }
}

/// Orders products by display name, ignoring case. Builds of one product
/// keep their scan order.
pub fn sort_by_display_name(products: &mut [ProductRecord]) {
    products.sort_by_cached_key(|p| product_display_name(&p.product_code, &p.name).to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn launch_json(launcher: &str) -> String {
        format!(
            r#"[{{"os": "{}", "arch": "{}", "launcherPath": "{}"}}]"#,
            current_platform_os(),
            std::env::consts::ARCH,
            launcher
        )
    }

    fn write_product(root: &Path, dir: &str, code: &str, build: &str) -> PathBuf {
        let product_dir = root.join(dir);
        fs::create_dir_all(product_dir.join("bin")).unwrap();
        let json = format!(
            r#"{{"name": "{dir}", "version": "2025.2", "buildNumber": "{build}",
                 "productCode": "{code}", "svgIconPath": "bin/icon.svg",
                 "productVendor": "JetBrains", "launch": {}}}"#,
            launch_json("bin/launcher")
        );
        fs::write(product_dir.join("product-info.json"), json).unwrap();
        fs::write(product_dir.join("bin/launcher"), "").unwrap();
        fs::write(product_dir.join("bin/icon.svg"), "<svg/>").unwrap();
        product_dir
    }

    #[test]
    fn test_scan_skips_malformed_and_codeless_metadata() {
        let tmp = TempDir::new().unwrap();
        write_product(tmp.path(), "idea", "IU", "252.23892.409");
        write_product(tmp.path(), "phpstorm", "PS", "252.1.2");

        let broken = tmp.path().join("broken");
        fs::create_dir(&broken).unwrap();
        fs::write(broken.join("product-info.json"), "{ not json").unwrap();

        let codeless = tmp.path().join("codeless");
        fs::create_dir(&codeless).unwrap();
        fs::write(codeless.join("product-info.json"), r#"{"name": "x"}"#).unwrap();

        fs::create_dir(tmp.path().join("no-metadata")).unwrap();

        let catalog = ProductCatalog::new();
        let products = catalog.get_installed_products(tmp.path());
        let codes: Vec<&str> = products.iter().map(|p| p.product_code.as_str()).collect();
        assert_eq!(codes, vec!["IU", "PS"]);
    }

    #[test]
    fn test_scan_attaches_resolved_paths() {
        let tmp = TempDir::new().unwrap();
        let dir = write_product(tmp.path(), "idea", "IU", "252.23892.409");

        let catalog = ProductCatalog::new();
        let product = catalog.find_product_by_code("iu", tmp.path()).unwrap();

        assert_eq!(
            product.resolved_executable_path.as_deref(),
            Some(paths::normalize_path(&dir.join("bin/launcher")).as_str())
        );
        assert_eq!(
            product.resolved_icon_path.as_deref(),
            Some(paths::normalize_path(&dir.join("bin/icon.svg")).as_str())
        );
        assert_eq!(product.install_dir, dir);
    }

    #[test]
    fn test_missing_root_is_empty_and_cached() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("later");
        let catalog = ProductCatalog::new();
        assert!(catalog.get_installed_products(&root).is_empty());

        // Installing within the TTL is not seen until the cache expires.
        fs::create_dir(&root).unwrap();
        write_product(&root, "idea", "IU", "1.0");
        assert!(catalog.get_installed_products(&root).is_empty());

        catalog.invalidate();
        assert_eq!(catalog.get_installed_products(&root).len(), 1);
    }

    #[test]
    fn test_resolve_executable_matches_by_metadata_not_directory_name() {
        let tmp = TempDir::new().unwrap();
        let dir = write_product(tmp.path(), "some-random-name", "GO", "252.1");
        let catalog = ProductCatalog::new();

        let product = load_product_record(&dir).unwrap();
        let exe = catalog.resolve_executable_path(&product, tmp.path());
        assert_eq!(exe, Some(paths::normalize_path(&dir.join("bin/launcher"))));

        let mut other = product.clone();
        other.product_code = "CL".to_string();
        assert_eq!(catalog.resolve_executable_path(&other, tmp.path()), None);
    }

    #[test]
    fn test_resolve_executable_without_platform_target_is_none() {
        let tmp = TempDir::new().unwrap();
        let dir = write_product(tmp.path(), "idea", "IU", "1.0");
        let mut product = load_product_record(&dir).unwrap();
        product.launch_targets = vec![LaunchTarget {
            os: "Plan9".to_string(),
            launcher_relative_path: "bin/launcher".to_string(),
            ..Default::default()
        }];

        let catalog = ProductCatalog::new();
        assert_eq!(catalog.resolve_executable_path(&product, tmp.path()), None);
    }

    #[test]
    fn test_select_launch_target_prefers_matching_arch() {
        let product = ProductRecord {
            launch_targets: vec![
                LaunchTarget {
                    os: "Linux".into(),
                    arch: "amd64".into(),
                    launcher_relative_path: "bin/idea.sh".into(),
                    ..Default::default()
                },
                LaunchTarget {
                    os: "linux".into(),
                    arch: "aarch64".into(),
                    launcher_relative_path: "bin/idea-arm.sh".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let arm = select_launch_target_for(&product, "Linux", "aarch64").unwrap();
        assert_eq!(arm.launcher_relative_path, "bin/idea-arm.sh");
        let unknown = select_launch_target_for(&product, "Linux", "riscv64").unwrap();
        assert_eq!(unknown.launcher_relative_path, "bin/idea.sh");
        assert!(select_launch_target_for(&product, "Windows", "amd64").is_none());
    }

    #[test]
    fn test_sort_by_display_name() {
        let product = |code: &str, name: &str, build: &str| ProductRecord {
            product_code: code.to_string(),
            name: name.to_string(),
            build_number: build.to_string(),
            ..Default::default()
        };
        let mut products = vec![
            product("WS", "WebStorm", "252.1"),
            product("ZZ", "aqua-like", "1.0"),
            product("CL", "CLion", "252.2"),
            product("WS", "WebStorm", "251.9"),
        ];

        sort_by_display_name(&mut products);
        let order: Vec<(&str, &str)> = products
            .iter()
            .map(|p| (p.product_code.as_str(), p.build_number.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("ZZ", "1.0"), ("CL", "252.2"), ("WS", "252.1"), ("WS", "251.9")]
        );
    }

    #[test]
    fn test_product_display_name() {
        assert_eq!(product_display_name("iu", ""), "IntelliJ IDEA Ultimate");
        assert_eq!(product_display_name("ZZ", "Fleet"), "Fleet");
        assert_eq!(product_display_name("ZZ", "  "), "Unknown");
    }
}
