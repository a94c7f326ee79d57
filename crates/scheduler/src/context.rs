//! Per-profile execution context and the handle a body runs against.

use crate::error::SchedulerError;
use crate::gate::ProfileGate;
use crate::queue::TaskQueue;
use crate::resource::ExclusiveResource;
use crate::settings::QueueSettings;
use botfleet_core::{
    Automation, ConfigKey, ConfigStore, Profile, ProfileId, ProfileServices, ScheduleDecision,
    TaskKey, TaskKind, TaskRepository,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Everything one profile's tasks share: the exclusive client, read-only
/// configuration, durable schedule storage, counters and the gate.
pub struct ExecutionContext {
    profile: Profile,
    config: Arc<dyn ConfigStore>,
    automation: ExclusiveResource<Box<dyn Automation>>,
    repository: Arc<dyn TaskRepository>,
    services: ProfileServices,
    gate: ProfileGate,
}

impl ExecutionContext {
    pub fn new(
        profile: Profile,
        config: Arc<dyn ConfigStore>,
        automation: Box<dyn Automation>,
        repository: Arc<dyn TaskRepository>,
        settings: &QueueSettings,
    ) -> Self {
        let marches = ConfigKey::MarchCount.clamp_int(config.get_int(profile.id, ConfigKey::MarchCount));
        let regen = ConfigKey::StaminaRegenMinutes
            .clamp_int(config.get_int(profile.id, ConfigKey::StaminaRegenMinutes));
        let services = ProfileServices::new(
            usize::try_from(marches).unwrap_or(0),
            Duration::minutes(regen),
        );
        let automation = ExclusiveResource::new(
            format!("client-{}", profile.id),
            automation,
            settings.resource_timeout,
        );

        Self {
            profile,
            config,
            automation,
            repository,
            services,
            gate: ProfileGate::new(),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn config(&self) -> &dyn ConfigStore {
        self.config.as_ref()
    }

    pub fn automation(&self) -> &ExclusiveResource<Box<dyn Automation>> {
        &self.automation
    }

    pub fn repository(&self) -> &dyn TaskRepository {
        self.repository.as_ref()
    }

    pub fn services(&self) -> &ProfileServices {
        &self.services
    }

    pub fn gate(&self) -> &ProfileGate {
        &self.gate
    }
}

const MAX_DELAY_DAYS: i64 = 365;

/// Handle passed to a body for the duration of one execution.
pub struct TaskContext<'a> {
    key: &'a TaskKey,
    now: DateTime<Utc>,
    automation: &'a mut dyn Automation,
    queue: &'a TaskQueue,
    decision: ScheduleDecision,
}

impl<'a> TaskContext<'a> {
    pub(crate) fn new(
        key: &'a TaskKey,
        now: DateTime<Utc>,
        automation: &'a mut dyn Automation,
        queue: &'a TaskQueue,
    ) -> Self {
        Self {
            key,
            now,
            automation,
            queue,
            decision: ScheduleDecision::Unset,
        }
    }

    pub fn key(&self) -> &TaskKey {
        self.key
    }

    pub fn kind(&self) -> TaskKind {
        self.key.kind
    }

    pub fn distinct_key(&self) -> &str {
        &self.key.distinct_key
    }

    pub fn profile(&self) -> &Profile {
        self.queue.execution().profile()
    }

    /// Start time of this execution.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn automation(&mut self) -> &mut dyn Automation {
        &mut *self.automation
    }

    pub fn services(&self) -> &ProfileServices {
        self.queue.execution().services()
    }

    pub fn config_bool(&self, key: ConfigKey) -> bool {
        self.queue.execution().config().get_bool(self.key.profile_id, key)
    }

    /// Always within [`ConfigKey::int_range`], whatever the store returns.
    pub fn config_int(&self, key: ConfigKey) -> i64 {
        key.clamp_int(self.queue.execution().config().get_int(self.key.profile_id, key))
    }

    pub fn config_text(&self, key: ConfigKey) -> String {
        self.queue.execution().config().get_text(self.key.profile_id, key)
    }

    pub fn reschedule(&mut self, at: DateTime<Utc>) {
        self.decision.reschedule(at);
    }

    /// Reschedule relative to [`now`](Self::now). The delay is capped at
    /// a year either way.
    pub fn reschedule_in(&mut self, delay: Duration) {
        let cap = Duration::days(MAX_DELAY_DAYS);
        let delay = delay.clamp(-cap, cap);
        let at = self.now.checked_add_signed(delay).unwrap_or(self.now);
        self.decision.reschedule(at);
    }

    pub fn reschedule_now(&mut self) {
        self.decision.reschedule(self.now);
    }

    pub fn set_recurring(&mut self, recurring: bool) {
        self.decision.set_recurring(recurring);
    }

    pub fn decision(&self) -> ScheduleDecision {
        self.decision
    }

    pub(crate) fn into_decision(self) -> ScheduleDecision {
        self.decision
    }

    /// Make a sibling task on this profile selectable on the next tick.
    pub fn trigger(&self, kind: TaskKind, bypass_gating: bool) -> Result<usize, SchedulerError> {
        self.queue.execute_task_now(kind, bypass_gating)
    }

    pub fn is_task_scheduled(&self, kind: TaskKind) -> bool {
        self.queue.is_task_scheduled(kind)
    }

    /// Read-only view of a sibling's schedule. `None` distinct key matches
    /// the kind's first instance.
    pub fn next_execution_time(&self, kind: TaskKind, distinct_key: Option<&str>) -> Option<DateTime<Utc>> {
        self.queue.next_execution_time(kind, distinct_key)
    }

    /// Look up another active profile's queue.
    pub fn queue_for(&self, profile_id: ProfileId) -> Option<Arc<TaskQueue>> {
        self.queue.lookup(profile_id)
    }
}
