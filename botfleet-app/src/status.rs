//! Plain-text and JSON status boards.

use botfleet_core::TaskState;
use botfleet_scheduler::{QueueManager, QueueStatus};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::fmt::Write;

fn status_label(status: &QueueStatus) -> String {
    match status {
        QueueStatus::Active => "active".to_string(),
        QueueStatus::Paused => "paused".to_string(),
        QueueStatus::Halted(reason) => format!("halted: {}", reason),
        QueueStatus::Stopped => "stopped".to_string(),
    }
}

fn state_label(state: TaskState) -> &'static str {
    match state {
        TaskState::Idle => "idle",
        TaskState::Scheduled => "scheduled",
        TaskState::Ready => "ready",
        TaskState::Executing => "executing",
    }
}

fn countdown(remaining: Option<chrono::Duration>) -> String {
    match remaining {
        None => "-".to_string(),
        Some(d) => {
            let secs = d.num_seconds().max(0);
            format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
        }
    }
}

/// One block per profile, tasks in presentation order.
pub fn render(manager: &QueueManager, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for summary in manager.profiles() {
        let _ = writeln!(
            out,
            "[{}] {} ({})",
            summary.profile.id,
            summary.profile.name,
            status_label(&summary.status)
        );
        let Ok(views) = manager.task_views(summary.profile.id, now) else {
            continue;
        };
        for view in views {
            let _ = writeln!(
                out,
                "  {:<28} {:<10} {}",
                view.key.to_string(),
                state_label(view.state),
                countdown(view.time_remaining(now))
            );
        }
    }
    out
}

pub fn render_json(manager: &QueueManager, now: DateTime<Utc>) -> Value {
    let profiles: Vec<Value> = manager
        .profiles()
        .into_iter()
        .map(|summary| {
            let tasks = manager.task_views(summary.profile.id, now).unwrap_or_default();
            json!({
                "id": summary.profile.id,
                "name": summary.profile.name,
                "status": status_label(&summary.status),
                "executing": summary.executing,
                "next_due_secs": summary.time_until_next_due.map(|d| d.as_secs()),
                "tasks": tasks,
            })
        })
        .collect();
    json!({ "generated_at": now, "profiles": profiles })
}
