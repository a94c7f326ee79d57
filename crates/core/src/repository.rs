//! Durable last/next execution times per task.

use crate::error::RepositoryError;
use crate::kind::TaskKind;
use crate::profile::ProfileId;
use crate::task::TaskKey;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub key: TaskKey,
    pub last_execution_time: Option<DateTime<Utc>>,
    pub next_execution_time: Option<DateTime<Utc>>,
    /// Taken out of the schedule by an operator; stays out across restarts.
    #[serde(default)]
    pub removed: bool,
}

/// Persistence collaborator. Implementations must tolerate concurrent saves
/// from different profiles' loops.
pub trait TaskRepository: Send + Sync {
    fn find(&self, key: &TaskKey) -> Result<Option<TaskRecord>, RepositoryError>;

    /// All records of one kind for a profile, across distinct keys.
    fn find_by_profile_and_kind(
        &self,
        profile_id: ProfileId,
        kind: TaskKind,
    ) -> Result<Vec<TaskRecord>, RepositoryError>;

    fn save(&self, record: &TaskRecord) -> Result<(), RepositoryError>;
}

/// Process-local repository; schedules do not survive a restart.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    records: Mutex<HashMap<TaskKey, TaskRecord>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn find(&self, key: &TaskKey) -> Result<Option<TaskRecord>, RepositoryError> {
        Ok(self.records.lock().get(key).cloned())
    }

    fn find_by_profile_and_kind(
        &self,
        profile_id: ProfileId,
        kind: TaskKind,
    ) -> Result<Vec<TaskRecord>, RepositoryError> {
        let records = self.records.lock();
        let mut found: Vec<TaskRecord> = records
            .values()
            .filter(|r| r.key.profile_id == profile_id && r.key.kind == kind)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.key.distinct_key.cmp(&b.key.distinct_key));
        Ok(found)
    }

    fn save(&self, record: &TaskRecord) -> Result<(), RepositoryError> {
        self.records.lock().insert(record.key.clone(), record.clone());
        Ok(())
    }
}
