//! Persistent synchronizer configuration and file-backed manager.

use chrono::{FixedOffset, Local, Offset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use worklog_api::config::DEFAULT_COOLDOWN_MS;

use crate::error::ConfigError;

fn default_request_cooldown_ms() -> u64 {
    DEFAULT_COOLDOWN_MS
}

/// Non-secret settings persisted on disk. Tokens live in the keyring, see
/// [`crate::secrets`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub toggl_workspace_id: Option<u64>,
    pub tempo_account_id: Option<String>,
    /// Offset Tempo wall-clock times are interpreted in. Local offset when unset.
    pub utc_offset_minutes: Option<i32>,
    pub toggl_base_url: Option<String>,
    pub tempo_base_url: Option<String>,
    #[serde(default = "default_request_cooldown_ms")]
    pub request_cooldown_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            toggl_workspace_id: None,
            tempo_account_id: None,
            utc_offset_minutes: None,
            toggl_base_url: None,
            tempo_base_url: None,
            request_cooldown_ms: default_request_cooldown_ms(),
        }
    }
}

impl Config {
    pub fn workspace_id(&self) -> Result<u64, ConfigError> {
        self.toggl_workspace_id
            .filter(|id| *id != 0)
            .ok_or(ConfigError::Missing("toggl_workspace_id"))
    }

    pub fn account_id(&self) -> Result<&str, ConfigError> {
        self.tempo_account_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::Missing("tempo_account_id"))
    }

    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        match self.utc_offset_minutes {
            Some(minutes) => FixedOffset::east_opt(minutes * 60).ok_or(ConfigError::Invalid {
                name: "utc_offset_minutes",
                reason: format!("{} is out of range", minutes),
            }),
            None => Ok(Local::now().offset().fix()),
        }
    }

    pub fn request_cooldown(&self) -> Duration {
        Duration::from_millis(self.request_cooldown_ms)
    }
}

/// Loads and saves [`Config`] as JSON in the platform config directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = directories::ProjectDirs::from("io", "worklog-sync", "worklog-sync")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::at(dirs.config_dir().join("config.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads config from disk, falling back to defaults on read/parse errors.
    pub fn load(&self) -> Config {
        if !self.path.exists() {
            return Config::default();
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                log::warn!("ignoring malformed config {}: {}", self.path.display(), err);
                Config::default()
            }),
            Err(err) => {
                log::warn!("cannot read config {}: {}", self.path.display(), err);
                Config::default()
            }
        }
    }

    /// Persists config to disk, creating parent directories when needed.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
