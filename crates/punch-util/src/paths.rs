//! Default paths for punchd
//!
//! Paths are user-writable by default (no root required):
//! - Settings: `$XDG_CONFIG_HOME/punchd` or `~/.config/punchd`
//! - Data: `$XDG_DATA_HOME/punchd` or `~/.local/share/punchd`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const PUNCHD_DATA_DIR_ENV: &str = "PUNCHD_DATA_DIR";

/// Database filename within the data directory
const DB_FILENAME: &str = "punchd.db";

/// Settings filename within the config directory
const SETTINGS_FILENAME: &str = "config.toml";

/// Application subdirectory name
const APP_DIR: &str = "punchd";

/// Get the default settings file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/punchd/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/punchd/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    // Try XDG_CONFIG_HOME first
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(SETTINGS_FILENAME);
    }

    // Fallback to ~/.config/punchd/config.toml
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(SETTINGS_FILENAME);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join(SETTINGS_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$PUNCHD_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/punchd` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/punchd` (fallback)
pub fn default_data_dir() -> PathBuf {
    // Check environment override first
    if let Ok(path) = std::env::var(PUNCHD_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking PUNCHD_DATA_DIR env var.
/// Used for default values in configs where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    // Try XDG_DATA_HOME first
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    // Fallback to ~/.local/share/punchd
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Default SQLite database path inside the data directory
pub fn default_db_path() -> PathBuf {
    default_data_dir().join(DB_FILENAME)
}
