// src/core/paths.rs

use crate::constants::{APP_CONFIG_DIRNAME, CONFIG_DIR_ENV, DEFAULT_VENDOR_DIRS, SETTINGS_FILENAME};
use lazy_static::lazy_static;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref APP_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Macro JetBrains writes in history keys in place of the user's home directory.
const USER_HOME_MACRO: &str = "$USER_HOME$";

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Returns the application configuration directory (`~/.config/jbrecent`, or
/// `$JBRECENT_CONFIG_DIR` when set). Creates it if it doesn't exist.
///
/// The first call computes and caches the path; subsequent calls return the
/// cached value.
pub fn get_app_config_dir() -> Result<PathBuf, PathError> {
    let mut cached_path_guard = APP_CONFIG_DIR.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &*cached_path_guard {
        return Ok(path.clone());
    }

    let config_path = resolve_app_config_dir(env::var_os(CONFIG_DIR_ENV))?;
    *cached_path_guard = Some(config_path.clone());
    Ok(config_path)
}

/// Picks `override_dir` when it is set and non-empty, the platform config
/// directory otherwise, and makes sure the directory exists.
fn resolve_app_config_dir(override_dir: Option<OsString>) -> Result<PathBuf, PathError> {
    let config_path = match override_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join(APP_CONFIG_DIRNAME),
    };

    if !config_path.exists() {
        fs::create_dir_all(&config_path).map_err(|e| PathError::ConfigDirCreation {
            path: config_path.display().to_string(),
            source: e,
        })?;
    }
    Ok(config_path)
}

/// Returns the path to `settings.toml` inside the application config directory.
pub fn get_settings_path() -> Result<PathBuf, PathError> {
    get_app_config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}

/// Renders a path as an absolute-looking string with forward slashes only.
/// Windows verbatim prefixes (`\\?\`) are stripped.
pub fn normalize_path(path: &Path) -> String {
    dunce::simplified(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Expands `~` and environment variables in a user-supplied location.
/// Returns `None` for an empty (unset) location.
pub fn expand_location(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match shellexpand::full(trimmed) {
        Ok(expanded) => Some(PathBuf::from(expanded.into_owned())),
        Err(e) => {
            log::warn!("Failed to expand location '{}': {}. Using it verbatim.", trimmed, e);
            Some(PathBuf::from(trimmed))
        }
    }
}

/// Replaces the `$USER_HOME$` macro in a history key. The rest of the key is
/// kept as written; a backslash is a legal file name character on Unix.
pub fn expand_path_macros(key: &str) -> String {
    if !key.contains(USER_HOME_MACRO) {
        return key.to_string();
    }
    match dirs::home_dir() {
        Some(home) => key.replace(USER_HOME_MACRO, &normalize_path(&home)),
        None => key.to_string(),
    }
}

/// Roots holding per-product config directories in the standard layout
/// (`%APPDATA%\JetBrains`, `~/.config/JetBrains`, and the Google equivalent
/// for Android Studio).
pub fn default_config_roots() -> Vec<PathBuf> {
    vendor_dirs_under(dirs::config_dir())
}

/// Roots holding per-product install directories when no custom location is set.
pub fn default_install_roots() -> Vec<PathBuf> {
    vendor_dirs_under(dirs::data_local_dir())
}

/// The directory where JetBrains Toolbox generates its shell scripts.
pub fn default_shell_scripts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("JetBrains").join("Toolbox").join("scripts"))
}

fn vendor_dirs_under(base: Option<PathBuf>) -> Vec<PathBuf> {
    match base {
        Some(base) => DEFAULT_VENDOR_DIRS.iter().map(|v| base.join(v)).collect(),
        None => {
            log::debug!("No platform base directory available; no default roots.");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_dir_override_is_created() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("jbrecent");

        let resolved = resolve_app_config_dir(Some(dir.clone().into_os_string())).unwrap();
        assert_eq!(resolved, dir);
        assert!(dir.is_dir());

        // Resolving again keeps the existing directory.
        assert_eq!(resolve_app_config_dir(Some(dir.clone().into_os_string())).unwrap(), dir);
    }

    #[test]
    fn test_settings_path_uses_memoized_config_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = resolve_app_config_dir(Some(tmp.path().join("cfg").into_os_string())).unwrap();
        *APP_CONFIG_DIR.lock().unwrap() = Some(dir.clone());

        assert_eq!(get_app_config_dir().unwrap(), dir);
        assert_eq!(get_settings_path().unwrap(), dir.join(SETTINGS_FILENAME));
    }

    #[test]
    fn test_normalize_path_uses_forward_slashes() {
        let path = Path::new("E:\\work\\foo");
        assert_eq!(normalize_path(path), "E:/work/foo");
        assert_eq!(normalize_path(Path::new("/opt/idea/bin")), "/opt/idea/bin");
    }

    #[test]
    fn test_expand_location_empty_is_none() {
        assert_eq!(expand_location(""), None);
        assert_eq!(expand_location("   "), None);
        assert_eq!(expand_location("/opt/jetbrains"), Some(PathBuf::from("/opt/jetbrains")));
    }

    #[test]
    fn test_expand_location_expands_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_location("~/apps"), Some(home.join("apps")));
        }
    }

    #[test]
    fn test_expand_path_macros() {
        assert_eq!(expand_path_macros("E:\\work\\amp"), "E:\\work\\amp");
        assert_eq!(expand_path_macros("/home/u/we\\ird"), "/home/u/we\\ird");
        if let Some(home) = dirs::home_dir() {
            let expected = format!("{}/IdeaProjects/demo", normalize_path(&home));
            assert_eq!(expand_path_macros("$USER_HOME$/IdeaProjects/demo"), expected);
        }
    }

    #[test]
    fn test_default_roots_are_vendor_directories() {
        for root in default_config_roots() {
            let name = root.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            assert!(DEFAULT_VENDOR_DIRS.contains(&name));
        }
    }
}
