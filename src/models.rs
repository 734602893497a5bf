// src/models.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// --- INSTALLED PRODUCT MODELS (product-info.json) ---

/// One platform entry of the `launch` array in `product-info.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LaunchTarget {
    pub os: String,
    pub arch: String,
    #[serde(rename = "launcherPath")]
    pub launcher_relative_path: String,
    pub java_executable_path: String,
    #[serde(rename = "vmOptionsFilePath")]
    pub vm_options_relative_path: String,
}

/// One installed IDE build, as described by its `product-info.json`.
///
/// Only the resolved paths and `install_dir` are filled in after
/// deserialization; the record is otherwise read-only.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub version: String,
    pub build_number: String,
    pub product_code: String,
    pub data_directory_name: String,
    #[serde(rename = "svgIconPath")]
    pub svg_icon_relative_path: String,
    #[serde(rename = "productVendor")]
    pub vendor: String,
    #[serde(rename = "launch")]
    pub launch_targets: Vec<LaunchTarget>,

    /// Directory the metadata was read from.
    #[serde(skip_deserializing)]
    pub install_dir: PathBuf,
    /// Absolute, forward-slash launcher path for the running platform.
    #[serde(skip_deserializing)]
    pub resolved_executable_path: Option<String>,
    /// Absolute, forward-slash path of the product SVG icon.
    #[serde(skip_deserializing)]
    pub resolved_icon_path: Option<String>,
}

// --- RECENT PROJECT MODELS (recentProjects.xml) ---

/// One entry of a product's recent-project history.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// Absolute project path; unique within one history file and never empty.
    pub path_key: String,
    pub display_name: String,
    pub frame_title: String,
    pub product_code: String,
    /// Build that last opened the project, e.g. `IU-252.23892.409`.
    pub build_string: String,
    /// Epoch milliseconds, 0 when unknown.
    pub activation_timestamp: i64,
    /// Epoch milliseconds, 0 when unknown.
    pub project_open_timestamp: i64,
    pub workspace_id: String,
    pub is_opened: bool,
}

impl ProjectRecord {
    /// The most recent of the activation and open timestamps.
    pub fn last_activity(&self) -> i64 {
        self.activation_timestamp.max(self.project_open_timestamp)
    }
}

/// A recent project joined with the installed build able to open it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchableProject {
    pub project: ProjectRecord,
    pub product: ProductRecord,
}

impl LaunchableProject {
    pub fn path(&self) -> &str {
        &self.project.path_key
    }

    pub fn name(&self) -> &str {
        &self.project.display_name
    }

    pub fn executable_path(&self) -> Option<&str> {
        self.product.resolved_executable_path.as_deref()
    }
}

/// A project as handed to the presentation layer, with its launcher if one was found.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub project: ProjectRecord,
    /// `None` means the launch command is unavailable and must be disabled.
    pub launcher: Option<String>,
}

/// Anything that can be ordered "currently open first, then most recent first".
pub trait Recency {
    fn is_opened(&self) -> bool;
    fn last_activity(&self) -> i64;
}

impl Recency for ProjectRecord {
    fn is_opened(&self) -> bool {
        self.is_opened
    }

    fn last_activity(&self) -> i64 {
        ProjectRecord::last_activity(self)
    }
}

impl Recency for LaunchableProject {
    fn is_opened(&self) -> bool {
        self.project.is_opened
    }

    fn last_activity(&self) -> i64 {
        self.project.last_activity()
    }
}

impl Recency for ProjectEntry {
    fn is_opened(&self) -> bool {
        self.project.is_opened
    }

    fn last_activity(&self) -> i64 {
        self.project.last_activity()
    }
}

// --- QUERY MODELS ---

/// Where a product's history file lives relative to its config directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// `<dir>/options/<file>`
    Standard,
    /// `<dir>/config/options/<file>`
    Custom,
}

/// Restricts a project listing to some products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ProductFilter {
    #[default]
    AllProducts,
    ByProductCode(String),
    /// A single installed build: same code and a build string containing `build_number`.
    ByProductBuild { code: String, build_number: String },
}

impl ProductFilter {
    /// Whether a project recorded with `code` and `build_string` passes the filter.
    pub fn matches(&self, code: &str, build_string: &str) -> bool {
        match self {
            Self::AllProducts => true,
            Self::ByProductCode(wanted) => wanted.eq_ignore_ascii_case(code),
            Self::ByProductBuild { code: wanted, build_number } => {
                wanted.eq_ignore_ascii_case(code) && build_string.contains(build_number.as_str())
            }
        }
    }
}

/// How many products a project is joined with when several build numbers match.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// One output per matching build number.
    #[default]
    All,
    /// Only the longest matching build number.
    Best,
}

// --- SETTINGS MODEL (settings.toml) ---

/// User settings. Empty strings mean "not configured".
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub tools_install_location: String,
    pub shell_scripts_location: String,
    pub system_config_logs_location: String,
    /// Use the custom locations and the `config/options` history layout.
    pub jetbrains_custom_option: bool,
    pub run_as_administrator: bool,
    pub match_policy: MatchPolicy,
}
