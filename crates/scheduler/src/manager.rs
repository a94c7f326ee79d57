//! Registry of per-profile queues.

use crate::body::BodyRegistry;
use crate::context::ExecutionContext;
use crate::error::SchedulerError;
use crate::queue::{build_tasks, Directory, QueueStatus, TaskQueue};
use crate::settings::QueueSettings;
use botfleet_core::{Automation, ConfigStore, Profile, ProfileId, TaskKind, TaskRepository, TaskView};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Status board row for one active profile.
#[derive(Debug, Clone)]
pub struct ProfileSummary {
    pub profile: Profile,
    pub status: QueueStatus,
    pub executing: Option<String>,
    pub time_until_next_due: Option<Duration>,
}

/// Owns one [`TaskQueue`] per active profile. Queues run independently; a
/// fatal halt in one never touches another.
pub struct QueueManager {
    directory: Arc<Directory>,
    bodies: Arc<dyn BodyRegistry>,
    config: Arc<dyn ConfigStore>,
    repository: Arc<dyn TaskRepository>,
    settings: QueueSettings,
}

impl QueueManager {
    pub fn new(
        bodies: Arc<dyn BodyRegistry>,
        config: Arc<dyn ConfigStore>,
        repository: Arc<dyn TaskRepository>,
        settings: QueueSettings,
    ) -> Self {
        Self {
            directory: Arc::new(RwLock::new(HashMap::new())),
            bodies,
            config,
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    /// Build and register a profile's queue without starting its loop.
    /// Callers drive it with [`TaskQueue::run_once`].
    pub fn prepare_profile(
        &self,
        profile: Profile,
        automation: Box<dyn Automation>,
    ) -> Result<Arc<TaskQueue>, SchedulerError> {
        let profile_id = profile.id;
        if self.directory.read().contains_key(&profile_id) {
            return Err(SchedulerError::ProfileAlreadyActive(profile_id));
        }

        let tasks = build_tasks(
            profile_id,
            self.config.as_ref(),
            self.repository.as_ref(),
            Utc::now(),
        )?;
        let count = tasks.len();
        let execution = ExecutionContext::new(
            profile,
            Arc::clone(&self.config),
            automation,
            Arc::clone(&self.repository),
            &self.settings,
        );
        let queue = Arc::new(
            TaskQueue::new(execution, tasks, Arc::clone(&self.bodies), self.settings.clone())?
                .with_directory(Arc::downgrade(&self.directory)),
        );

        let mut queues = self.directory.write();
        if queues.contains_key(&profile_id) {
            return Err(SchedulerError::ProfileAlreadyActive(profile_id));
        }
        queues.insert(profile_id, Arc::clone(&queue));
        info!("Prepared queue for profile {} with {} tasks", profile_id, count);
        Ok(queue)
    }

    /// Build, register and start a profile's queue.
    pub fn activate_profile(
        &self,
        profile: Profile,
        automation: Box<dyn Automation>,
    ) -> Result<Arc<TaskQueue>, SchedulerError> {
        let profile_id = profile.id;
        let queue = self.prepare_profile(profile, automation)?;
        if let Err(e) = queue.start() {
            self.directory.write().remove(&profile_id);
            return Err(e);
        }
        info!("Activated profile {}", profile_id);
        Ok(queue)
    }

    /// Stop and discard a profile's queue. The in-flight body, if any, runs
    /// to completion first.
    pub fn deactivate_profile(&self, profile_id: ProfileId) -> Result<(), SchedulerError> {
        let queue = self
            .directory
            .write()
            .remove(&profile_id)
            .ok_or(SchedulerError::ProfileNotActive(profile_id))?;
        queue.stop();
        info!("Deactivated profile {}", profile_id);
        Ok(())
    }

    pub fn get_queue(&self, profile_id: ProfileId) -> Option<Arc<TaskQueue>> {
        self.directory.read().get(&profile_id).cloned()
    }

    fn queue(&self, profile_id: ProfileId) -> Result<Arc<TaskQueue>, SchedulerError> {
        self.get_queue(profile_id)
            .ok_or(SchedulerError::ProfileNotActive(profile_id))
    }

    /// Active profiles ordered by priority, then id.
    pub fn profiles(&self) -> Vec<ProfileSummary> {
        let now = Utc::now();
        let queues: Vec<Arc<TaskQueue>> = self.directory.read().values().cloned().collect();
        let mut summaries: Vec<ProfileSummary> = queues
            .iter()
            .map(|queue| ProfileSummary {
                profile: queue.execution().profile().clone(),
                status: queue.status(),
                executing: queue.executing().map(|k| k.to_string()),
                time_until_next_due: queue.time_until_next_due(now),
            })
            .collect();
        summaries.sort_by(|a, b| {
            a.profile
                .priority
                .cmp(&b.profile.priority)
                .then(a.profile.id.cmp(&b.profile.id))
        });
        summaries
    }

    pub fn task_views(&self, profile_id: ProfileId, now: DateTime<Utc>) -> Result<Vec<TaskView>, SchedulerError> {
        Ok(self.queue(profile_id)?.views(now))
    }

    pub fn schedule_now(&self, profile_id: ProfileId, kind: TaskKind) -> Result<usize, SchedulerError> {
        self.queue(profile_id)?.schedule_now(kind)
    }

    pub fn remove_from_schedule(
        &self,
        profile_id: ProfileId,
        kind: TaskKind,
        distinct_key: &str,
    ) -> Result<(), SchedulerError> {
        self.queue(profile_id)?.remove_from_schedule(kind, distinct_key)
    }

    /// Trigger one task instance on a profile.
    pub fn execute_now(
        &self,
        profile_id: ProfileId,
        kind: TaskKind,
        distinct_key: &str,
        bypass_gating: bool,
    ) -> Result<usize, SchedulerError> {
        self.queue(profile_id)?.execute_now(kind, distinct_key, bypass_gating)
    }

    /// Stop every queue and wait for their loops to exit.
    pub fn shutdown(&self) {
        let queues: Vec<(ProfileId, Arc<TaskQueue>)> = self.directory.write().drain().collect();
        if queues.is_empty() {
            return;
        }
        info!("Shutting down {} profile queues", queues.len());
        for (profile_id, queue) in queues {
            if let QueueStatus::Halted(reason) = queue.status() {
                warn!("Profile {} was halted: {}", profile_id, reason);
            }
            queue.stop();
        }
    }
}

impl Drop for QueueManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
