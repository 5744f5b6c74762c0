//! Application configuration file support.
//!
//! Settings are read from a `rapport.toml` file. Every section is optional
//! and missing keys fall back to their defaults, so an empty file (or no
//! file at all) is a valid configuration.
//!
//! ```toml
//! [repository]
//! type = "sqlite"
//!
//! [sqlite]
//! path = "rapport.db"
//!
//! [scheduling]
//! horizon_months = 3
//! upcoming_slot_limit = 20
//!
//! [attention]
//! birthday_window_days = 14
//! neglect_weeks = 4
//! neglected_limit = 5
//! reminder_window_days = 7
//! reminder_limit = 5
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! ```

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::db::factory::RepositoryType;
use crate::db::repository::RepositoryError;
use crate::services::attention::{
    DEFAULT_BIRTHDAY_WINDOW_DAYS, DEFAULT_NEGLECTED_LIMIT, DEFAULT_NEGLECT_WEEKS,
};
use crate::services::recurrence::{DEFAULT_HORIZON_MONTHS, DEFAULT_UPCOMING_SLOT_LIMIT};
use crate::services::reminders::{DEFAULT_REMINDER_LIMIT, DEFAULT_REMINDER_WINDOW_DAYS};

/// File name searched by [`AppConfig::from_default_location`].
pub const CONFIG_FILE_NAME: &str = "rapport.toml";

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub sqlite: SqliteSettings,
    #[serde(default)]
    pub scheduling: SchedulingSettings,
    #[serde(default)]
    pub attention: AttentionSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
        }
    }
}

fn default_repo_type() -> String {
    "local".to_string()
}

/// SQLite file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteSettings {
    #[serde(default = "default_sqlite_path")]
    pub path: PathBuf,
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("rapport.db")
}

/// Slot generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingSettings {
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,
    #[serde(default = "default_upcoming_slot_limit")]
    pub upcoming_slot_limit: usize,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            horizon_months: default_horizon_months(),
            upcoming_slot_limit: default_upcoming_slot_limit(),
        }
    }
}

fn default_horizon_months() -> u32 {
    DEFAULT_HORIZON_MONTHS
}

fn default_upcoming_slot_limit() -> usize {
    DEFAULT_UPCOMING_SLOT_LIMIT
}

/// Dashboard "needs attention" settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionSettings {
    #[serde(default = "default_birthday_window_days")]
    pub birthday_window_days: u32,
    #[serde(default = "default_neglect_weeks")]
    pub neglect_weeks: u32,
    #[serde(default = "default_neglected_limit")]
    pub neglected_limit: usize,
    #[serde(default = "default_reminder_window_days")]
    pub reminder_window_days: u32,
    #[serde(default = "default_reminder_limit")]
    pub reminder_limit: usize,
}

impl Default for AttentionSettings {
    fn default() -> Self {
        Self {
            birthday_window_days: default_birthday_window_days(),
            neglect_weeks: default_neglect_weeks(),
            neglected_limit: default_neglected_limit(),
            reminder_window_days: default_reminder_window_days(),
            reminder_limit: default_reminder_limit(),
        }
    }
}

fn default_birthday_window_days() -> u32 {
    DEFAULT_BIRTHDAY_WINDOW_DAYS
}

fn default_neglect_weeks() -> u32 {
    DEFAULT_NEGLECT_WEEKS
}

fn default_neglected_limit() -> usize {
    DEFAULT_NEGLECTED_LIMIT
}

fn default_reminder_window_days() -> u32 {
    DEFAULT_REMINDER_WINDOW_DAYS
}

fn default_reminder_limit() -> usize {
    DEFAULT_REMINDER_LIMIT
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl ServerSettings {
    /// Apply `HOST` and `PORT` overrides. An unparsable port is ignored.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("HOST") {
            if !host.trim().is_empty() {
                self.host = host.trim().to_string();
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            match port.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid PORT value {:?}", port),
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `rapport.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// # Returns
    /// * `Ok(Some(AppConfig))` if found and parsed successfully
    /// * `Ok(None)` if no file exists in any of the locations
    /// * `Err(RepositoryError)` on a read or parse error
    pub fn from_default_location() -> Result<Option<Self>, RepositoryError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                info!("Loading configuration from {:?}", path);
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Configuration for the running process: the file at `RAPPORT_CONFIG`
    /// if set, else the default location, else defaults. Server env
    /// overrides are applied last.
    pub fn load() -> Result<Self, RepositoryError> {
        let mut config = match std::env::var("RAPPORT_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::from_default_location()?.unwrap_or_default(),
        };
        config.server.apply_env();
        Ok(config)
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }
}
