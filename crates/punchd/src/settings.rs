//! Daemon settings
//!
//! TOML settings with server, storage, and scheduler sections. Every field
//! has a default and a missing file counts as empty, so the daemon runs
//! with zero setup.

use punch_util::{default_db_path, DaysOfWeek};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Daemon settings, all sections optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Listen address for the HTTP API
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// SQLite database location
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// Seconds between reminder evaluation passes
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Holiday lookup endpoint; plain workweek math when unset
    #[serde(default)]
    pub holiday_api_url: Option<String>,

    /// Working days as comma-separated names (default: mon-fri)
    #[serde(default)]
    pub workweek: Option<String>,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_tick_secs() -> u64 {
    60
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            holiday_api_url: None,
            workweek: None,
        }
    }
}

impl Settings {
    /// Working days for the reminder calendar
    pub fn workweek_days(&self) -> DaysOfWeek {
        self.scheduler
            .workweek
            .as_deref()
            .and_then(DaysOfWeek::from_csv)
            .unwrap_or(DaysOfWeek::WEEKDAYS)
    }

    fn validate(&self) -> SettingsResult<()> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(SettingsError::Invalid(format!(
                "bad bind address {:?}",
                self.server.bind
            )));
        }
        if self.scheduler.tick_secs == 0 || self.scheduler.tick_secs > 3600 {
            return Err(SettingsError::Invalid(format!(
                "tick_secs must be within 1..=3600, got {}",
                self.scheduler.tick_secs
            )));
        }
        if let Some(csv) = &self.scheduler.workweek
            && DaysOfWeek::from_csv(csv).is_none()
        {
            return Err(SettingsError::Invalid(format!("bad workweek {:?}", csv)));
        }
        Ok(())
    }
}

/// Load and validate settings, treating a missing file as empty
pub fn load_settings(path: impl AsRef<Path>) -> SettingsResult<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Parse and validate settings from a TOML string
pub fn parse_settings(content: &str) -> SettingsResult<Settings> {
    let settings: Settings = toml::from_str(content)?;
    settings.validate()?;
    Ok(settings)
}
