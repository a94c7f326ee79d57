//! Derived presentation order for observers.

use crate::task::{Task, TaskKey, TaskState};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// Point-in-time view of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub key: TaskKey,
    pub state: TaskState,
    pub recurring: bool,
    pub executing: bool,
    pub next_execution_time: Option<DateTime<Utc>>,
    pub last_execution_time: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
}

impl TaskView {
    pub fn capture(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            key: task.key().clone(),
            state: task.state(now),
            recurring: task.is_recurring(),
            executing: task.is_executing(),
            next_execution_time: task.next_execution_time(),
            last_execution_time: task.last_execution_time(),
            due_at: task.effective_due(now),
        }
    }

    /// Time until due, clamped at zero. `None` for idle tasks.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.due_at.map(|due| (due - now).max(Duration::zero()))
    }

    fn is_scheduled(&self) -> bool {
        self.executing || self.state != TaskState::Idle
    }
}

/// Scheduled before idle, executing first, then ready, then by time remaining.
pub fn compare_for_display(a: &TaskView, b: &TaskView, now: DateTime<Utc>) -> Ordering {
    b.is_scheduled()
        .cmp(&a.is_scheduled())
        .then_with(|| b.executing.cmp(&a.executing))
        .then_with(|| (b.state == TaskState::Ready).cmp(&(a.state == TaskState::Ready)))
        .then_with(|| match (a.time_remaining(now), b.time_remaining(now)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

pub fn sort_for_display(views: &mut [TaskView], now: DateTime<Utc>) {
    views.sort_by(|a, b| compare_for_display(a, b, now));
}
