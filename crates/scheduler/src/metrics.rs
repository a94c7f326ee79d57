//! Metrics instrumentation for scheduler observability.

use botfleet_core::TaskKind;
use std::time::Instant;

/// Record how long one body ran.
pub fn record_task_duration(kind: TaskKind, duration_ms: f64) {
    metrics::histogram!("task_execution_duration", duration_ms, "kind" => kind.as_str());
}

/// Record how long a task waited for the automation client.
pub fn record_lease_wait(duration_ms: f64) {
    metrics::histogram!("resource_lease_wait", duration_ms);
}

pub fn increment_recoverable_aborts(kind: TaskKind) {
    metrics::counter!("task_recoverable_aborts", 1, "kind" => kind.as_str());
}

pub fn increment_safety_net_reschedules(kind: TaskKind) {
    metrics::counter!("task_safety_net_reschedules", 1, "kind" => kind.as_str());
}

pub fn increment_fatal_halts() {
    metrics::counter!("profile_fatal_halts", 1);
}

/// RAII timer recording a task's duration on drop.
pub struct TaskTimer {
    start: Instant,
    kind: TaskKind,
}

impl TaskTimer {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            start: Instant::now(),
            kind,
        }
    }
}

impl Drop for TaskTimer {
    fn drop(&mut self) {
        record_task_duration(self.kind, self.start.elapsed().as_secs_f64() * 1000.0);
    }
}
