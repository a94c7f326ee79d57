use botfleet_core::{ProfileId, RepositoryError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Profile not active: {0}")]
    ProfileNotActive(ProfileId),

    #[error("Profile already active: {0}")]
    ProfileAlreadyActive(ProfileId),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Duplicate task: {0}")]
    DuplicateTask(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Failed to spawn queue loop: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Resource {name} still held by {holder} after {waited:?}")]
    Timeout {
        name: String,
        holder: String,
        waited: Duration,
    },
}
