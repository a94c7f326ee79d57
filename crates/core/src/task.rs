//! Task scheduling state machine.
//!
//! A task is Idle (not recurring), Scheduled (due in the future), Ready (due
//! now or triggered) or Executing. Only the owning queue drives transitions;
//! bodies express theirs through a [`ScheduleDecision`].

use crate::kind::TaskKind;
use crate::profile::ProfileId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a task within a queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey {
    pub profile_id: ProfileId,
    pub kind: TaskKind,
    /// Defaults to the kind name when the kind has no variants.
    pub distinct_key: String,
}

impl TaskKey {
    pub fn new(profile_id: ProfileId, kind: TaskKind) -> Self {
        Self {
            profile_id,
            kind,
            distinct_key: kind.as_str().to_string(),
        }
    }

    pub fn with_distinct(profile_id: ProfileId, kind: TaskKind, distinct_key: impl Into<String>) -> Self {
        Self {
            profile_id,
            kind,
            distinct_key: distinct_key.into(),
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.distinct_key == self.kind.as_str() {
            write!(f, "{}/{}", self.profile_id, self.kind)
        } else {
            write!(f, "{}/{}:{}", self.profile_id, self.kind, self.distinct_key)
        }
    }
}

/// Out-of-band request to run a task now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub at: DateTime<Utc>,
    pub bypass_gating: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    Idle,
    Scheduled,
    Ready,
    Executing,
}

/// What a body asked for before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleDecision {
    /// Nothing was requested; the queue applies its safety net.
    #[default]
    Unset,
    Reschedule(DateTime<Utc>),
    Stop,
}

impl ScheduleDecision {
    pub fn reschedule(&mut self, at: DateTime<Utc>) {
        *self = ScheduleDecision::Reschedule(at);
    }

    pub fn set_recurring(&mut self, recurring: bool) {
        if !recurring {
            *self = ScheduleDecision::Stop;
        } else if *self == ScheduleDecision::Stop {
            *self = ScheduleDecision::Unset;
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, ScheduleDecision::Unset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    key: TaskKey,
    recurring: bool,
    executing: bool,
    next_execution_time: Option<DateTime<Utc>>,
    last_execution_time: Option<DateTime<Utc>>,
    trigger: Option<Trigger>,
    removed: bool,
}

impl Task {
    pub fn new(key: TaskKey, recurring: bool, next_execution_time: Option<DateTime<Utc>>) -> Self {
        Self {
            key,
            recurring,
            executing: false,
            next_execution_time,
            last_execution_time: None,
            trigger: None,
            removed: false,
        }
    }

    pub fn with_last_execution(mut self, last: Option<DateTime<Utc>>) -> Self {
        self.last_execution_time = last;
        self
    }

    /// Restore an operator removal; a removed task is never recurring.
    pub fn with_removed(mut self, removed: bool) -> Self {
        self.removed = removed;
        if removed {
            self.recurring = false;
        }
        self
    }

    pub fn key(&self) -> &TaskKey {
        &self.key
    }

    pub fn kind(&self) -> TaskKind {
        self.key.kind
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring
    }

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    pub fn next_execution_time(&self) -> Option<DateTime<Utc>> {
        self.next_execution_time
    }

    pub fn last_execution_time(&self) -> Option<DateTime<Utc>> {
        self.last_execution_time
    }

    pub fn trigger(&self) -> Option<Trigger> {
        self.trigger
    }

    /// Removed by an operator and not rescheduled since.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Time used for earliest-first selection, if the task is in the schedule.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        match (self.trigger, self.recurring) {
            (Some(trigger), _) => Some(trigger.at),
            (None, true) => self.next_execution_time,
            (None, false) => None,
        }
    }

    /// Scheduled or triggered, regardless of due-ness.
    pub fn is_in_schedule(&self) -> bool {
        self.trigger.is_some() || (self.recurring && self.next_execution_time.is_some())
    }

    /// Due time as seen at `now`. A pending trigger is due no later than
    /// `now`, even if it was stamped after the caller sampled the clock.
    pub fn effective_due(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.trigger {
            Some(trigger) => Some(trigger.at.min(now)),
            None => self.due_at(),
        }
    }

    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        !self.executing && self.effective_due(now).is_some_and(|due| due <= now)
    }

    pub fn state(&self, now: DateTime<Utc>) -> TaskState {
        if self.executing {
            TaskState::Executing
        } else if self.is_eligible(now) {
            TaskState::Ready
        } else if self.is_in_schedule() {
            TaskState::Scheduled
        } else {
            TaskState::Idle
        }
    }

    /// Force the task to Ready. A newer trigger keeps the earlier time.
    pub fn request_trigger(&mut self, at: DateTime<Utc>, bypass_gating: bool) {
        self.trigger = Some(match self.trigger {
            Some(existing) => Trigger {
                at: existing.at.min(at),
                bypass_gating: existing.bypass_gating || bypass_gating,
            },
            None => Trigger { at, bypass_gating },
        });
    }

    /// Put the task back in the schedule at `at` without a trigger.
    pub fn schedule_at(&mut self, at: DateTime<Utc>) {
        self.recurring = true;
        self.removed = false;
        self.next_execution_time = Some(at);
    }

    /// Remove from the schedule; the task stays addressable.
    pub fn unschedule(&mut self) {
        self.recurring = false;
        self.removed = true;
        self.trigger = None;
    }

    /// Ready -> Executing. Returns the consumed trigger, if any.
    pub fn begin(&mut self) -> Option<Trigger> {
        self.executing = true;
        self.trigger.take()
    }

    /// Executing -> Scheduled/Ready/Idle, per the body's decision.
    ///
    /// `Unset` must be resolved by the caller before finishing.
    pub fn finish(&mut self, started_at: DateTime<Utc>, decision: ScheduleDecision) {
        self.executing = false;
        self.last_execution_time = Some(started_at);
        match decision {
            ScheduleDecision::Reschedule(at) => {
                self.recurring = true;
                self.removed = false;
                self.next_execution_time = Some(at);
            }
            ScheduleDecision::Stop => self.recurring = false,
            ScheduleDecision::Unset => {}
        }
    }

    /// Abandon an attempt, restoring the trigger it consumed.
    pub fn abort(&mut self, consumed: Option<Trigger>) {
        self.executing = false;
        if self.trigger.is_none() {
            self.trigger = consumed;
        }
    }
}

/// Index of the most-due eligible task: earliest due time, ties broken by
/// position in `tasks`.
pub fn select_due(tasks: &[Task], now: DateTime<Utc>) -> Option<usize> {
    let mut best: Option<(usize, DateTime<Utc>)> = None;
    for (idx, task) in tasks.iter().enumerate() {
        if !task.is_eligible(now) {
            continue;
        }
        let Some(due) = task.effective_due(now) else {
            continue;
        };
        match best {
            Some((_, best_due)) if best_due <= due => {}
            _ => best = Some((idx, due)),
        }
    }
    best.map(|(idx, _)| idx)
}
