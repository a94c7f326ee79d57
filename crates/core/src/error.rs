//! Error taxonomy shared by task bodies, the scheduler and its collaborators.

use thiserror::Error;

/// Outcome of a task body that did not complete normally.
///
/// Transient recognition misses and unmet dependencies are not errors: a body
/// handles them itself and reschedules. Only conditions the body cannot act
/// through surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Abort this attempt only; the task keeps its previous schedule.
    #[error("Recoverable: {0}")]
    Recoverable(String),

    /// Halt the owning profile's loop until it is reinitialized.
    #[error("Fatal: {0}")]
    Fatal(String),
}

impl TaskError {
    pub fn recoverable(reason: impl Into<String>) -> Self {
        TaskError::Recoverable(reason.into())
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        TaskError::Fatal(reason.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, TaskError::Fatal(_))
    }
}

/// Failures reported by the automation client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomationError {
    #[error("Client not installed: {0}")]
    ClientMissing(String),

    #[error("Device disconnected: {0}")]
    Disconnected(String),

    #[error("Recognition failed: {0}")]
    Recognition(String),
}

impl From<AutomationError> for TaskError {
    fn from(err: AutomationError) -> Self {
        match err {
            AutomationError::ClientMissing(_) => TaskError::Fatal(err.to_string()),
            AutomationError::Disconnected(_) | AutomationError::Recognition(_) => {
                TaskError::Recoverable(err.to_string())
            }
        }
    }
}

/// Persistence boundary errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Storage error: {0}")]
    Storage(String),
}
