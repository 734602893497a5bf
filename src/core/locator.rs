// src/core/locator.rs

//! Maps installation and config roots to the per-product files we read.
//!
//! A missing root, a missing metadata file or a missing history file is the
//! normal state of a machine where some product was never installed or
//! used, so none of these functions report errors.

use crate::constants::{
    CUSTOM_CONFIG_DIR, OPTIONS_DIR, PRODUCT_INFO_FILENAME, RECENT_PROJECTS_FILENAME,
    RECENT_SOLUTIONS_FILENAME,
};
use crate::models::LayoutKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the immediate subdirectories of `root`, sorted by path.
/// Returns an empty list when `root` does not exist or cannot be read.
pub fn find_product_directories(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        log::debug!("Root '{}' does not exist; nothing to scan.", root.display());
        return Vec::new();
    }

    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry under '{}': {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect();

    dirs.sort();
    dirs
}

/// Rider keeps its history in `recentSolutions.xml`; detection is by
/// directory name (`Rider2025.2`, `JetBrainsRider`, ...).
pub fn is_rider_directory(product_dir_name: &str) -> bool {
    product_dir_name.to_lowercase().contains("rider")
}

/// File name of the history document for a product directory.
pub fn history_file_name(product_dir_name: &str) -> &'static str {
    if is_rider_directory(product_dir_name) {
        RECENT_SOLUTIONS_FILENAME
    } else {
        RECENT_PROJECTS_FILENAME
    }
}

/// Where the history file of a product config directory should be.
/// The file itself is not checked for existence.
pub fn resolve_history_file_path(
    product_dir: &Path,
    product_dir_name: &str,
    layout: LayoutKind,
) -> PathBuf {
    let options_dir = match layout {
        LayoutKind::Standard => product_dir.join(OPTIONS_DIR),
        LayoutKind::Custom => product_dir.join(CUSTOM_CONFIG_DIR).join(OPTIONS_DIR),
    };
    options_dir.join(history_file_name(product_dir_name))
}

/// Returns `<product_dir>/product-info.json` when it exists.
pub fn find_metadata_file(product_dir: &Path) -> Option<PathBuf> {
    let path = product_dir.join(PRODUCT_INFO_FILENAME);
    path.is_file().then_some(path)
}

/// Every existing history file directly below the product directories of `root`.
pub fn find_history_files(root: &Path, layout: LayoutKind) -> Vec<PathBuf> {
    find_product_directories(root)
        .into_iter()
        .filter_map(|dir| {
            let dir_name = dir.file_name()?.to_string_lossy().into_owned();
            let path = resolve_history_file_path(&dir, &dir_name, layout);
            path.is_file().then_some(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<application/>").unwrap();
    }

    #[test]
    fn test_missing_root_yields_no_directories() {
        let tmp = TempDir::new().unwrap();
        assert!(find_product_directories(&tmp.path().join("nope")).is_empty());
    }

    #[test]
    fn test_only_directories_are_listed() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("IntelliJIdea2025.2")).unwrap();
        fs::create_dir(tmp.path().join("PhpStorm2025.1")).unwrap();
        fs::write(tmp.path().join("README.txt"), "x").unwrap();

        let dirs = find_product_directories(tmp.path());
        assert_eq!(
            dirs,
            vec![
                tmp.path().join("IntelliJIdea2025.2"),
                tmp.path().join("PhpStorm2025.1")
            ]
        );
    }

    #[test]
    fn test_history_path_layouts() {
        let dir = Path::new("/cfg/IntelliJIdea2025.2");
        assert_eq!(
            resolve_history_file_path(dir, "IntelliJIdea2025.2", LayoutKind::Standard),
            dir.join("options").join("recentProjects.xml")
        );
        assert_eq!(
            resolve_history_file_path(dir, "IntelliJIdea2025.2", LayoutKind::Custom),
            dir.join("config").join("options").join("recentProjects.xml")
        );
    }

    #[test]
    fn test_rider_uses_recent_solutions() {
        let dir = Path::new("/cfg/Rider2025.1");
        assert_eq!(
            resolve_history_file_path(dir, "Rider2025.1", LayoutKind::Standard),
            dir.join("options").join("recentSolutions.xml")
        );
        assert!(is_rider_directory("JetBrainsRIDER"));
        assert!(!is_rider_directory("WebStorm2025.2"));
    }

    #[test]
    fn test_find_metadata_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_metadata_file(tmp.path()), None);

        fs::write(tmp.path().join("product-info.json"), "{}").unwrap();
        assert_eq!(
            find_metadata_file(tmp.path()),
            Some(tmp.path().join("product-info.json"))
        );
    }

    #[test]
    fn test_find_history_files_skips_products_without_history() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("IntelliJIdea2025.2/options/recentProjects.xml"));
        touch(&tmp.path().join("Rider2025.1/options/recentSolutions.xml"));
        fs::create_dir_all(tmp.path().join("GoLand2025.1/options")).unwrap();

        let files = find_history_files(tmp.path(), LayoutKind::Standard);
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.ends_with("recentSolutions.xml")));

        assert!(find_history_files(tmp.path(), LayoutKind::Custom).is_empty());
    }
}
