//! Per-profile task queue: due-selection and the serialized execution loop.

use crate::body::BodyRegistry;
use crate::context::{ExecutionContext, TaskContext};
use crate::error::SchedulerError;
use crate::gate::GateStatus;
use crate::metrics::{self, TaskTimer};
use crate::navigation::ensure_location;
use crate::settings::QueueSettings;
use botfleet_core::{
    select_due, sort_for_display, Automation, ConfigStore, ProfileId, ScheduleDecision, Task,
    TaskError, TaskKey, TaskKind, TaskRecord, TaskRepository, TaskView, Trigger,
};
use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Directory of active queues, shared by the manager and every queue.
pub type Directory = RwLock<HashMap<ProfileId, Arc<TaskQueue>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueStatus {
    Active,
    Paused,
    /// A fatal signal stopped the loop; needs reactivation.
    Halted(String),
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Completed(ScheduleDecision),
    Recovered(String),
    Fatal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another task of this profile is executing.
    Busy,
    Idle,
    Paused,
    Blocked(String),
    Executed {
        key: TaskKey,
        outcome: ExecutionOutcome,
    },
    Halted(String),
    Stopped,
}

struct QueueState {
    tasks: Vec<Task>,
    status: QueueStatus,
    wake_pending: bool,
}

pub struct TaskQueue {
    execution: ExecutionContext,
    bodies: Arc<dyn BodyRegistry>,
    settings: QueueSettings,
    state: Mutex<QueueState>,
    wake: Condvar,
    directory: Weak<Directory>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Instantiate one task per catalog kind, expanded per distinct key, resuming
/// any stored schedule.
pub fn build_tasks(
    profile_id: ProfileId,
    config: &dyn ConfigStore,
    repository: &dyn TaskRepository,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, SchedulerError> {
    let mut tasks = Vec::new();
    for kind in TaskKind::ALL {
        let descriptor = kind.descriptor();
        let kind_enabled = config.get_bool(profile_id, descriptor.enabled_by);

        let instances: Vec<(TaskKey, bool)> = if descriptor.variants.is_empty() {
            vec![(TaskKey::new(profile_id, kind), kind_enabled)]
        } else {
            descriptor
                .variants
                .iter()
                .map(|v| {
                    let enabled = kind_enabled && config.get_bool(profile_id, v.enabled_by);
                    (TaskKey::with_distinct(profile_id, kind, v.key), enabled)
                })
                .collect()
        };

        for (key, enabled) in instances {
            let record = repository.find(&key)?;
            let removed = record.as_ref().is_some_and(|r| r.removed);
            let recurring = descriptor.recurring_by_default && enabled && !removed;
            let last = record.as_ref().and_then(|r| r.last_execution_time);
            let next = match record.and_then(|r| r.next_execution_time) {
                Some(stored) => Some(stored),
                None if recurring => Some(now),
                None => None,
            };
            tasks.push(
                Task::new(key, recurring, next)
                    .with_last_execution(last)
                    .with_removed(removed),
            );
        }
    }
    Ok(tasks)
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(365))
}

fn record_of(task: &Task) -> TaskRecord {
    TaskRecord {
        key: task.key().clone(),
        last_execution_time: task.last_execution_time(),
        next_execution_time: task.next_execution_time(),
        removed: task.is_removed(),
    }
}

impl TaskQueue {
    pub fn new(
        execution: ExecutionContext,
        tasks: Vec<Task>,
        bodies: Arc<dyn BodyRegistry>,
        settings: QueueSettings,
    ) -> Result<Self, SchedulerError> {
        let mut seen = HashSet::new();
        for task in &tasks {
            if !seen.insert(task.key().clone()) {
                return Err(SchedulerError::DuplicateTask(task.key().to_string()));
            }
        }

        Ok(Self {
            execution,
            bodies,
            settings,
            state: Mutex::new(QueueState {
                tasks,
                status: QueueStatus::Active,
                wake_pending: false,
            }),
            wake: Condvar::new(),
            directory: Weak::new(),
            worker: Mutex::new(None),
        })
    }

    pub(crate) fn with_directory(mut self, directory: Weak<Directory>) -> Self {
        self.directory = directory;
        self
    }

    pub fn profile_id(&self) -> ProfileId {
        self.execution.profile().id
    }

    pub fn execution(&self) -> &ExecutionContext {
        &self.execution
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    pub fn status(&self) -> QueueStatus {
        self.state.lock().status.clone()
    }

    pub fn pause(&self) {
        let mut state = self.state.lock();
        if state.status == QueueStatus::Active {
            state.status = QueueStatus::Paused;
            info!("Queue paused for profile {}", self.profile_id());
        }
    }

    pub fn resume(&self) {
        let mut state = self.state.lock();
        if state.status == QueueStatus::Paused {
            state.status = QueueStatus::Active;
            info!("Queue resumed for profile {}", self.profile_id());
        }
        self.notify(&mut state);
    }

    /// True when any instance of `kind` is recurring, due or not.
    pub fn is_task_scheduled(&self, kind: TaskKind) -> bool {
        self.state
            .lock()
            .tasks
            .iter()
            .any(|t| t.kind() == kind && t.is_recurring())
    }

    /// Force every instance of `kind` to Ready. Returns how many were hit.
    pub fn execute_task_now(&self, kind: TaskKind, bypass_gating: bool) -> Result<usize, SchedulerError> {
        self.trigger_matching(kind, None, bypass_gating)
    }

    /// Force one instance to Ready.
    pub fn execute_now(&self, kind: TaskKind, distinct_key: &str, bypass_gating: bool) -> Result<usize, SchedulerError> {
        self.trigger_matching(kind, Some(distinct_key), bypass_gating)
    }

    fn trigger_matching(
        &self,
        kind: TaskKind,
        distinct_key: Option<&str>,
        bypass_gating: bool,
    ) -> Result<usize, SchedulerError> {
        let now = Utc::now();
        let mut state = self.state.lock();
        let mut hit = 0;
        for task in state.tasks.iter_mut().filter(|t| is_instance(t, kind, distinct_key)) {
            task.request_trigger(now, bypass_gating);
            debug!("Triggered task {} (bypass gating: {})", task.key(), bypass_gating);
            hit += 1;
        }
        if hit == 0 {
            return Err(SchedulerError::TaskNotFound(describe(self.profile_id(), kind, distinct_key)));
        }
        self.notify(&mut state);
        Ok(hit)
    }

    /// Put every instance of `kind` back in the schedule, due now.
    pub fn schedule_now(&self, kind: TaskKind) -> Result<usize, SchedulerError> {
        let now = Utc::now();
        let mut state = self.state.lock();
        let mut records = Vec::new();
        for task in state.tasks.iter_mut().filter(|t| t.kind() == kind) {
            task.schedule_at(now);
            records.push(record_of(task));
        }
        if records.is_empty() {
            return Err(SchedulerError::TaskNotFound(describe(self.profile_id(), kind, None)));
        }
        self.notify(&mut state);
        drop(state);

        for record in &records {
            self.persist(record);
        }
        Ok(records.len())
    }

    /// Make one instance Idle, durably. It stays addressable for later
    /// triggers.
    pub fn remove_from_schedule(&self, kind: TaskKind, distinct_key: &str) -> Result<(), SchedulerError> {
        let record = {
            let mut state = self.state.lock();
            let task = state
                .tasks
                .iter_mut()
                .find(|t| is_instance(t, kind, Some(distinct_key)))
                .ok_or_else(|| {
                    SchedulerError::TaskNotFound(describe(self.profile_id(), kind, Some(distinct_key)))
                })?;
            task.unschedule();
            info!("Removed task {} from schedule", task.key());
            record_of(task)
        };
        self.persist(&record);
        Ok(())
    }

    pub fn next_execution_time(&self, kind: TaskKind, distinct_key: Option<&str>) -> Option<DateTime<Utc>> {
        self.state
            .lock()
            .tasks
            .iter()
            .find(|t| is_instance(t, kind, distinct_key))
            .and_then(Task::next_execution_time)
    }

    /// Smallest wait until a scheduled, non-executing task is due.
    pub fn time_until_next_due(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.state
            .lock()
            .tasks
            .iter()
            .filter(|t| !t.is_executing())
            .filter_map(|t| t.effective_due(now))
            .min()
            .map(|due| (due - now).to_std().unwrap_or(Duration::ZERO))
    }

    pub fn executing(&self) -> Option<TaskKey> {
        self.state
            .lock()
            .tasks
            .iter()
            .find(|t| t.is_executing())
            .map(|t| t.key().clone())
    }

    /// Every task in presentation order.
    pub fn views(&self, now: DateTime<Utc>) -> Vec<TaskView> {
        let mut views: Vec<TaskView> = self
            .state
            .lock()
            .tasks
            .iter()
            .map(|t| TaskView::capture(t, now))
            .collect();
        sort_for_display(&mut views, now);
        views
    }

    pub fn view(&self, kind: TaskKind, distinct_key: Option<&str>, now: DateTime<Utc>) -> Option<TaskView> {
        self.state
            .lock()
            .tasks
            .iter()
            .find(|t| is_instance(t, kind, distinct_key))
            .map(|t| TaskView::capture(t, now))
    }

    pub(crate) fn lookup(&self, profile_id: ProfileId) -> Option<Arc<TaskQueue>> {
        let directory = self.directory.upgrade()?;
        let queues = directory.read();
        queues.get(&profile_id).cloned()
    }

    /// One selection step: pick the most-due task and run it to completion.
    pub fn run_once(&self, now: DateTime<Utc>) -> TickOutcome {
        let (idx, key, consumed) = {
            let mut state = self.state.lock();
            match &state.status {
                QueueStatus::Active => {}
                QueueStatus::Paused => return TickOutcome::Paused,
                QueueStatus::Halted(reason) => return TickOutcome::Halted(reason.clone()),
                QueueStatus::Stopped => return TickOutcome::Stopped,
            }
            if state.tasks.iter().any(Task::is_executing) {
                return TickOutcome::Busy;
            }
            let Some(mut idx) = select_due(&state.tasks, now) else {
                return TickOutcome::Idle;
            };

            if !bypasses_gate(&state.tasks[idx]) {
                if let GateStatus::Blocked(reason) = self.execution.gate().check(now) {
                    match select_bypassing(&state.tasks, now) {
                        Some(bypassing) => idx = bypassing,
                        None => {
                            debug!("Profile {} gated, skipping tick: {}", self.profile_id(), reason);
                            return TickOutcome::Blocked(reason);
                        }
                    }
                }
            }
            let task = &mut state.tasks[idx];
            let consumed = task.begin();
            (idx, task.key().clone(), consumed)
        };

        info!("Executing task {}", key);
        let result = {
            let _timer = TaskTimer::new(key.kind);
            // Covers the lease, navigation and the body: a panicking client
            // must not leave the task marked executing.
            match panic::catch_unwind(AssertUnwindSafe(|| self.execute_attempt(&key, now))) {
                Ok(result) => result,
                Err(_) => Err(TaskError::fatal(format!("task {} panicked", key))),
            }
        };
        self.complete(idx, key, now, consumed, result)
    }

    fn execute_attempt(&self, key: &TaskKey, now: DateTime<Utc>) -> Result<ScheduleDecision, TaskError> {
        let mut lease = self
            .execution
            .automation()
            .acquire(&key.to_string())
            .map_err(|e| TaskError::recoverable(e.to_string()))?;
        metrics::record_lease_wait(lease.wait_time().as_secs_f64() * 1000.0);
        let automation: &mut dyn Automation = &mut **lease;

        if let Some(location) = key.kind.descriptor().required_location {
            ensure_location(
                automation,
                location,
                self.settings.navigation_attempts,
                self.settings.navigation_pacing,
            )?;
        }

        let body = self.bodies.body(key.kind);
        let mut ctx = TaskContext::new(key, now, automation, self);
        body.execute(&mut ctx)?;
        Ok(ctx.into_decision())
    }

    fn complete(
        &self,
        idx: usize,
        key: TaskKey,
        started_at: DateTime<Utc>,
        consumed: Option<Trigger>,
        result: Result<ScheduleDecision, TaskError>,
    ) -> TickOutcome {
        let mut state = self.state.lock();
        let outcome = match result {
            Ok(decision) => {
                let decision = if decision.is_unset() {
                    warn!(
                        "Task {} returned without a scheduling decision, retrying in {:?}",
                        key, self.settings.default_retry
                    );
                    metrics::increment_safety_net_reschedules(key.kind);
                    ScheduleDecision::Reschedule(started_at + to_chrono(self.settings.default_retry))
                } else {
                    decision
                };
                state.tasks[idx].finish(started_at, decision);
                ExecutionOutcome::Completed(decision)
            }
            Err(TaskError::Recoverable(reason)) => {
                state.tasks[idx].abort(consumed);
                ExecutionOutcome::Recovered(reason)
            }
            Err(TaskError::Fatal(reason)) => {
                state.tasks[idx].abort(consumed);
                if state.status != QueueStatus::Stopped {
                    state.status = QueueStatus::Halted(reason.clone());
                }
                ExecutionOutcome::Fatal(reason)
            }
        };
        let record = record_of(&state.tasks[idx]);
        drop(state);

        match &outcome {
            ExecutionOutcome::Completed(decision) => {
                match decision {
                    ScheduleDecision::Reschedule(at) => info!("Task {} finished, next run at {}", key, at),
                    _ => info!("Task {} finished, no longer recurring", key),
                }
                self.persist(&record);
            }
            ExecutionOutcome::Recovered(reason) => {
                warn!("Task {} aborted: {}", key, reason);
                metrics::increment_recoverable_aborts(key.kind);
                if !self.settings.recoverable_cooldown.is_zero() {
                    self.execution
                        .gate()
                        .block_until(started_at + to_chrono(self.settings.recoverable_cooldown), reason.clone());
                }
            }
            ExecutionOutcome::Fatal(reason) => {
                error!("Task {} hit a fatal error, halting profile {}: {}", key, key.profile_id, reason);
                metrics::increment_fatal_halts();
            }
        }

        TickOutcome::Executed { key, outcome }
    }

    fn persist(&self, record: &TaskRecord) {
        if let Err(e) = self.execution.repository().save(record) {
            warn!("Failed to persist schedule for {}: {}", record.key, e);
        }
    }

    fn notify(&self, state: &mut QueueState) {
        state.wake_pending = true;
        self.wake.notify_all();
    }

    /// Wake an idle loop so it reselects immediately.
    pub fn wake(&self) {
        let mut state = self.state.lock();
        self.notify(&mut state);
    }

    /// Spawn the background loop. No-op if it is already running.
    pub fn start(self: &Arc<Self>) -> Result<(), SchedulerError> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }
        let queue = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(format!("botfleet-profile-{}", self.profile_id()))
            .spawn(move || queue.run_loop())?;
        *worker = Some(handle);
        Ok(())
    }

    /// Stop the loop after the current execution and wait for it to exit.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock();
            state.status = QueueStatus::Stopped;
            self.notify(&mut state);
        }

        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        // A body deactivating its own profile cannot join its own thread.
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!("Queue loop for profile {} panicked", self.profile_id());
        }
    }

    fn run_loop(&self) {
        info!("Queue loop started for profile {}", self.profile_id());
        loop {
            let now = Utc::now();
            let outcome = self.run_once(now);
            let wait = match &outcome {
                TickOutcome::Halted(_) | TickOutcome::Stopped => break,
                TickOutcome::Executed { .. } => continue,
                TickOutcome::Idle => self
                    .time_until_next_due(now)
                    .map_or(self.settings.tick_interval, |d| d.min(self.settings.tick_interval)),
                TickOutcome::Busy | TickOutcome::Paused | TickOutcome::Blocked(_) => {
                    self.settings.tick_interval
                }
            };

            let mut state = self.state.lock();
            if state.status == QueueStatus::Stopped {
                break;
            }
            if !state.wake_pending && !wait.is_zero() {
                self.wake.wait_for(&mut state, wait);
            }
            state.wake_pending = false;
        }
        info!("Queue loop exited for profile {}", self.profile_id());
    }
}

fn bypasses_gate(task: &Task) -> bool {
    task.trigger().is_some_and(|t| t.bypass_gating)
}

/// Most-due eligible task whose trigger ignores the gate.
fn select_bypassing(tasks: &[Task], now: DateTime<Utc>) -> Option<usize> {
    let mut best: Option<(usize, DateTime<Utc>)> = None;
    for (idx, task) in tasks.iter().enumerate() {
        if !task.is_eligible(now) || !bypasses_gate(task) {
            continue;
        }
        let Some(due) = task.effective_due(now) else {
            continue;
        };
        if best.map_or(true, |(_, best_due)| due < best_due) {
            best = Some((idx, due));
        }
    }
    best.map(|(idx, _)| idx)
}

fn is_instance(task: &Task, kind: TaskKind, distinct_key: Option<&str>) -> bool {
    task.kind() == kind && distinct_key.map_or(true, |k| task.key().distinct_key == k)
}

fn describe(profile_id: ProfileId, kind: TaskKind, distinct_key: Option<&str>) -> String {
    match distinct_key {
        Some(k) => format!("{}/{}:{}", profile_id, kind, k),
        None => format!("{}/{}", profile_id, kind),
    }
}
