//! Fleet configuration loader.

use botfleet_core::{ConfigKey, ConfigValue, Profile, ProfileId, StaticConfigStore};
use botfleet_scheduler::QueueSettings;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Scheduler timing, in the units used in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    pub tick_interval_ms: u64,
    pub default_retry_secs: u64,
    pub recoverable_cooldown_secs: u64,
    pub resource_timeout_secs: u64,
    pub navigation_attempts: u32,
    pub navigation_pacing_ms: u64,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            default_retry_secs: 300,
            recoverable_cooldown_secs: 5,
            resource_timeout_secs: 30,
            navigation_attempts: 3,
            navigation_pacing_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileSection {
    pub id: ProfileId,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub priority: u32,
    /// Per-profile overrides; unset keys use their defaults.
    #[serde(default)]
    pub config: HashMap<ConfigKey, ConfigValue>,
}

fn default_enabled() -> bool {
    true
}

fn default_database_path() -> PathBuf {
    PathBuf::from("botfleet.db")
}

#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub profiles: Vec<ProfileSection>,
}

impl FleetConfig {
    /// Read and validate a YAML fleet file. A relative `database_path` is
    /// resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Err(ConfigError::Invalid("config file is empty".to_string()));
        }

        let mut config = Self::from_yaml(&content)?;
        if config.database_path.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.database_path = base.join(&config.database_path);
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: FleetConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.tick_interval_ms must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if profile.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("profile {} has an empty name", profile.id)));
            }
            if !seen.insert(profile.id) {
                return Err(ConfigError::Invalid(format!("duplicate profile id {}", profile.id)));
            }
            for (key, value) in &profile.config {
                let expected = key.default_value();
                if std::mem::discriminant(&expected) != std::mem::discriminant(value) {
                    return Err(ConfigError::Invalid(format!(
                        "profile {}: {:?} expects a value like {:?}, got {:?}",
                        profile.id, key, expected, value
                    )));
                }
                if let (Some(range), ConfigValue::Int(v)) = (key.int_range(), value) {
                    if !range.contains(v) {
                        return Err(ConfigError::Invalid(format!(
                            "profile {}: {:?} must be within {}..={}, got {}",
                            profile.id,
                            key,
                            range.start(),
                            range.end(),
                            v
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn queue_settings(&self) -> QueueSettings {
        let s = &self.scheduler;
        QueueSettings {
            tick_interval: Duration::from_millis(s.tick_interval_ms),
            default_retry: Duration::from_secs(s.default_retry_secs),
            recoverable_cooldown: Duration::from_secs(s.recoverable_cooldown_secs),
            resource_timeout: Duration::from_secs(s.resource_timeout_secs),
            navigation_attempts: s.navigation_attempts,
            navigation_pacing: Duration::from_millis(s.navigation_pacing_ms),
        }
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.profiles
            .iter()
            .map(|p| Profile {
                id: p.id,
                name: p.name.clone(),
                enabled: p.enabled,
                priority: p.priority,
            })
            .collect()
    }

    pub fn config_store(&self) -> StaticConfigStore {
        let mut store = StaticConfigStore::new();
        for profile in &self.profiles {
            store.insert_profile(profile.id, profile.config.clone());
        }
        store
    }
}
