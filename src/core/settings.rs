// src/core/settings.rs

use crate::core::paths::{self, PathError};
use crate::models::{LayoutKind, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents errors that can occur while reading or writing `settings.toml`.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A filesystem I/O error occurred.
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    /// The application config directory could not be determined or created.
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    /// The settings file is not valid TOML for [`Settings`].
    #[error("Failed to parse settings file '{path}': {source}")]
    TomlDeserialize {
        /// The file that failed to parse.
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// An error occurred while serializing settings to TOML format.
    #[error("Failed to serialize to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

type SettingsResult<T> = Result<T, SettingsError>;

/// Loads the user's settings, writing a default `settings.toml` on first use.
pub fn load() -> SettingsResult<Settings> {
    let path = paths::get_settings_path()?;
    load_from(&path)
}

/// Saves `settings` to the user's `settings.toml`.
pub fn save(settings: &Settings) -> SettingsResult<()> {
    let path = paths::get_settings_path()?;
    save_to(settings, &path)
}

/// Loads settings from `path`, creating the file with defaults if it is missing.
pub fn load_from(path: &Path) -> SettingsResult<Settings> {
    if !path.exists() {
        log::info!(
            "Settings file '{}' not found. Creating it with defaults.",
            path.display()
        );
        let defaults = Settings::default();
        save_to(&defaults, path)?;
        return Ok(defaults);
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| SettingsError::TomlDeserialize {
        path: path.display().to_string(),
        source: e,
    })
}

/// Writes `settings` to `path` as pretty-printed TOML.
pub fn save_to(settings: &Settings, path: &Path) -> SettingsResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let toml_string = toml::to_string_pretty(settings)?;
    fs::write(path, toml_string)?;
    log::debug!("Settings written to '{}'", path.display());
    Ok(())
}

impl Settings {
    /// The layout history files are read with.
    pub fn layout(&self) -> LayoutKind {
        if self.jetbrains_custom_option {
            LayoutKind::Custom
        } else {
            LayoutKind::Standard
        }
    }

    /// Directories whose subdirectories are installed products.
    pub fn install_roots(&self) -> Vec<PathBuf> {
        if self.jetbrains_custom_option {
            paths::expand_location(&self.tools_install_location)
                .into_iter()
                .collect()
        } else {
            paths::default_install_roots()
        }
    }

    /// Directories whose subdirectories are product config directories,
    /// with the layout their history files follow.
    pub fn history_roots(&self) -> Vec<(PathBuf, LayoutKind)> {
        if self.jetbrains_custom_option {
            paths::expand_location(&self.system_config_logs_location)
                .map(|root| (root, LayoutKind::Custom))
                .into_iter()
                .collect()
        } else {
            paths::default_config_roots()
                .into_iter()
                .map(|root| (root, LayoutKind::Standard))
                .collect()
        }
    }

    /// Where Toolbox shell scripts are looked up.
    pub fn shell_scripts_dir(&self) -> Option<PathBuf> {
        paths::expand_location(&self.shell_scripts_location)
            .or_else(paths::default_shell_scripts_dir)
    }
}
