//! TOML-based application configuration.
//!
//! Stores gym-side tunables:
//! - Check-in cooldown
//! - Attendance listing defaults
//!
//! Configuration is stored at `~/.config/dojotrack/config.toml`.

use std::path::PathBuf;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::checkin::CheckInPolicy;
use crate::error::ConfigError;

/// Check-in gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInSettings {
    /// Minimum interval between two accepted check-ins, in hours.
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: u32,
}

/// Attendance listing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSettings {
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/dojotrack/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub checkin: CheckInSettings,
    #[serde(default)]
    pub attendance: AttendanceSettings,
}

fn default_cooldown_hours() -> u32 {
    6
}
fn default_list_limit() -> u32 {
    20
}

impl Default for CheckInSettings {
    fn default() -> Self {
        Self {
            cooldown_hours: default_cooldown_hours(),
        }
    }
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checkin: CheckInSettings::default(),
            attendance: AttendanceSettings::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the default config on first run.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// The check-in policy configured here.
    pub fn check_in_policy(&self) -> CheckInPolicy {
        CheckInPolicy::with_cooldown(Duration::hours(i64::from(self.checkin.cooldown_hours)))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and save.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// into the field's type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;

        let (section_path, leaf) = match key.rsplit_once('.') {
            Some((section, leaf)) => (Some(section), leaf),
            None => (None, key),
        };

        let target = match section_path {
            None => &mut json,
            Some(path) => {
                let mut current = &mut json;
                for part in path.split('.') {
                    current = current
                        .get_mut(part)
                        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                }
                current
            }
        };

        let obj = target
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(leaf)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse().map_err(|_| {
                ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("cannot parse '{value}' as bool"),
                }
            })?),
            serde_json::Value::Number(_) => {
                let n: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("cannot parse '{value}' as number"),
                })?;
                serde_json::Value::Number(n.into())
            }
            _ => serde_json::Value::String(value.to_string()),
        };

        obj.insert(leaf.to_string(), new_value);
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()
    }
}
