//! Wire the fleet together from a configuration file.

use anyhow::{Context, Result};
use botfleet_core::{Automation, ConfigKey, ConfigStore, Profile};
use botfleet_infra::{FleetConfig, SqliteTaskRepository};
use botfleet_scheduler::QueueManager;
use botfleet_tasks::Catalog;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds one automation client per profile, given its emulator serial.
pub type ClientFactory = dyn Fn(&Profile, &str) -> Box<dyn Automation>;

pub struct Fleet {
    pub manager: QueueManager,
    pub profiles: Vec<Profile>,
    config: Arc<dyn ConfigStore>,
}

impl Fleet {
    pub fn from_config(config: &FleetConfig) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }
        let repository = SqliteTaskRepository::new(&config.database_path).with_context(|| {
            format!("Failed to open task store {}", config.database_path.display())
        })?;
        info!("Task store opened at {}", config.database_path.display());

        let store: Arc<dyn ConfigStore> = Arc::new(config.config_store());
        let manager = QueueManager::new(
            Arc::new(Catalog::new()),
            Arc::clone(&store),
            Arc::new(repository),
            config.queue_settings(),
        );

        Ok(Self {
            manager,
            profiles: config.profiles(),
            config: store,
        })
    }

    /// Start every enabled profile. A profile that fails to start is logged
    /// and skipped. Returns how many started.
    pub fn activate_enabled(&self, clients: &ClientFactory) -> usize {
        let mut started = 0;
        for profile in self.profiles.iter().filter(|p| p.enabled) {
            let serial = self.config.get_text(profile.id, ConfigKey::EmulatorSerial);
            let client = clients(profile, &serial);
            match self.manager.activate_profile(profile.clone(), client) {
                Ok(_) => started += 1,
                Err(e) => warn!("Failed to activate profile {} ({}): {}", profile.id, profile.name, e),
            }
        }
        info!("{} of {} profiles active", started, self.profiles.len());
        started
    }

    /// Register every enabled profile without starting loops, to inspect the
    /// resumed schedule.
    pub fn prepare_enabled(&self, clients: &ClientFactory) -> Result<usize> {
        let mut prepared = 0;
        for profile in self.profiles.iter().filter(|p| p.enabled) {
            let serial = self.config.get_text(profile.id, ConfigKey::EmulatorSerial);
            self.manager
                .prepare_profile(profile.clone(), clients(profile, &serial))
                .with_context(|| format!("Failed to prepare profile {}", profile.id))?;
            prepared += 1;
        }
        Ok(prepared)
    }

    pub fn shutdown(&self) {
        self.manager.shutdown();
    }
}
