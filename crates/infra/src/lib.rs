//! Durable collaborators: SQLite task records and the YAML fleet file.

pub mod fleet_config;
pub mod task_store;

pub use fleet_config::{ConfigError, FleetConfig, ProfileSection, SchedulerSection};
pub use task_store::{SqliteTaskRepository, TaskStoreError};
