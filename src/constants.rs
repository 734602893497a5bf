// src/constants.rs

use std::time::Duration;

/// The metadata file every JetBrains product ships at the root of its install directory.
pub const PRODUCT_INFO_FILENAME: &str = "product-info.json";

/// History file used by every product except Rider.
pub const RECENT_PROJECTS_FILENAME: &str = "recentProjects.xml";

/// History file used by Rider.
pub const RECENT_SOLUTIONS_FILENAME: &str = "recentSolutions.xml";

/// Directory holding the history file inside a product config directory.
pub const OPTIONS_DIR: &str = "options";

/// Extra directory level used by the custom (Toolbox "system, config, logs") layout.
pub const CUSTOM_CONFIG_DIR: &str = "config";

/// How long scanned catalogs, icon paths, launchers and merged lists stay fresh.
pub const CACHE_TTL: Duration = Duration::from_secs(15);

/// Extensions probed for Toolbox shell scripts, in tie-break preference order.
pub const SHELL_SCRIPT_EXTENSIONS: [&str; 3] = [".cmd", ".bat", ""];

/// Highest numeric suffix probed for Toolbox shell scripts (`idea1` .. `idea10`).
pub const MAX_SHELL_SCRIPT_SUFFIX: u32 = 10;

/// Name of the application directory inside the user's config directory.
pub const APP_CONFIG_DIRNAME: &str = "jbrecent";

/// The settings file (inside the application config directory).
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// Environment variable that overrides the application config directory.
pub const CONFIG_DIR_ENV: &str = "JBRECENT_CONFIG_DIR";

/// Vendor directory names scanned under the default config and install roots.
pub const DEFAULT_VENDOR_DIRS: [&str; 2] = ["JetBrains", "Google"];
