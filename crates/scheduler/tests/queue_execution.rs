#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Single-step queue behavior driven through `run_once`.

mod common;

use botfleet_core::{
    AutomationError, ConfigKey, ConfigValue, Profile, ScheduleDecision, StaticConfigStore, Task,
    TaskError, TaskKey, TaskKind, TaskRepository, TaskState,
};
use botfleet_scheduler::{
    body_fn, ExecutionOutcome, QueueManager, QueueStatus, SchedulerError, TickOutcome,
};
use chrono::{Duration, Utc};
use common::*;
use std::sync::{Arc, Mutex};

fn key(kind: TaskKind) -> TaskKey {
    TaskKey::new(1, kind)
}

#[test]
fn test_reschedule_sets_next_time_and_clears_executing() {
    let now = Utc::now();
    let target = now + Duration::minutes(42);
    let registry = TestRegistry::new().with(
        TaskKind::Intel,
        body_fn(move |ctx| {
            ctx.reschedule(target);
            Ok(())
        }),
    );
    let (queue, repository) = queue_with(
        vec![Task::new(key(TaskKind::Intel), true, Some(now))],
        registry,
        StubAutomation::new(),
        fast_settings(),
    );

    let outcome = queue.run_once(now);
    assert_eq!(
        outcome,
        TickOutcome::Executed {
            key: key(TaskKind::Intel),
            outcome: ExecutionOutcome::Completed(ScheduleDecision::Reschedule(target)),
        }
    );

    let view = queue.view(TaskKind::Intel, None, now).unwrap();
    assert_eq!(view.next_execution_time, Some(target));
    assert_eq!(view.last_execution_time, Some(now));
    assert!(!view.executing);
    assert_eq!(view.state, TaskState::Scheduled);

    let stored = repository.find(&key(TaskKind::Intel)).unwrap().unwrap();
    assert_eq!(stored.next_execution_time, Some(target));
}

#[test]
fn test_set_recurring_false_excludes_task_from_selection() {
    let now = Utc::now();
    let registry = TestRegistry::new().with(
        TaskKind::Intel,
        body_fn(|ctx| {
            ctx.set_recurring(false);
            Ok(())
        }),
    );
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::Intel), true, Some(now))],
        registry,
        StubAutomation::new(),
        fast_settings(),
    );

    assert!(matches!(queue.run_once(now), TickOutcome::Executed { .. }));
    assert!(!queue.is_task_scheduled(TaskKind::Intel));
    for hours in [0, 1, 24, 24 * 30] {
        assert_eq!(queue.run_once(now + Duration::hours(hours)), TickOutcome::Idle);
    }
}

#[test]
fn test_overdue_task_runs_on_next_tick() {
    let now = Utc::now();
    let (queue, _) = queue_with(
        vec![
            Task::new(key(TaskKind::OnlineReward), true, Some(now + Duration::minutes(1))),
            Task::new(key(TaskKind::Intel), true, Some(now - Duration::hours(6))),
        ],
        TestRegistry::new(),
        StubAutomation::new(),
        fast_settings(),
    );

    match queue.run_once(now) {
        TickOutcome::Executed { key: k, .. } => assert_eq!(k.kind, TaskKind::Intel),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(queue.run_once(now), TickOutcome::Idle);
}

#[test]
fn test_missing_decision_falls_back_to_default_retry() {
    let now = Utc::now();
    let registry = TestRegistry::new().with(TaskKind::AllianceTech, body_fn(|_ctx| Ok(())));
    let settings = fast_settings();
    let retry = Duration::from_std(settings.default_retry).unwrap();
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::AllianceTech), true, Some(now))],
        registry,
        StubAutomation::new(),
        settings,
    );

    queue.run_once(now);
    assert_eq!(
        queue.next_execution_time(TaskKind::AllianceTech, None),
        Some(now + retry)
    );
    assert!(queue.is_task_scheduled(TaskKind::AllianceTech));
}

#[test]
fn test_execute_task_now_runs_non_recurring_task() {
    let now = Utc::now();
    let ran = Arc::new(Mutex::new(Vec::new()));
    let seen = ran.clone();
    let registry = TestRegistry::new().with(
        TaskKind::MysteryShop,
        body_fn(move |ctx| {
            seen.lock().unwrap().push(ctx.now());
            ctx.set_recurring(false);
            Ok(())
        }),
    );
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::MysteryShop), false, None)],
        registry,
        StubAutomation::new(),
        fast_settings(),
    );

    assert_eq!(queue.run_once(now), TickOutcome::Idle);
    assert_eq!(queue.execute_task_now(TaskKind::MysteryShop, false).unwrap(), 1);

    let later = Utc::now();
    assert!(matches!(queue.run_once(later), TickOutcome::Executed { .. }));
    assert_eq!(ran.lock().unwrap().len(), 1);
    assert_eq!(queue.run_once(Utc::now()), TickOutcome::Idle);
}

#[test]
fn test_body_trigger_makes_sibling_ready() {
    let now = Utc::now();
    let registry = TestRegistry::new()
        .with(
            TaskKind::DailyMissions,
            body_fn(|ctx| {
                ctx.trigger(TaskKind::MysteryShop, false)
                    .map_err(|e| TaskError::recoverable(e.to_string()))?;
                ctx.reschedule_in(Duration::hours(4));
                Ok(())
            }),
        )
        .with(
            TaskKind::MysteryShop,
            body_fn(|ctx| {
                ctx.set_recurring(false);
                Ok(())
            }),
        );
    let (queue, _) = queue_with(
        vec![
            Task::new(key(TaskKind::DailyMissions), true, Some(now)),
            Task::new(key(TaskKind::MysteryShop), false, None),
        ],
        registry,
        StubAutomation::new(),
        fast_settings(),
    );

    match queue.run_once(now) {
        TickOutcome::Executed { key: k, .. } => assert_eq!(k.kind, TaskKind::DailyMissions),
        other => panic!("unexpected outcome {:?}", other),
    }
    match queue.run_once(Utc::now()) {
        TickOutcome::Executed { key: k, .. } => assert_eq!(k.kind, TaskKind::MysteryShop),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_trigger_unknown_kind_is_not_found() {
    let now = Utc::now();
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::Intel), true, Some(now))],
        TestRegistry::new(),
        StubAutomation::new(),
        fast_settings(),
    );
    let err = queue.execute_task_now(TaskKind::Gather, false).unwrap_err();
    assert!(matches!(err, SchedulerError::TaskNotFound(_)));
}

#[test]
fn test_recoverable_error_keeps_schedule_and_cools_down() {
    let now = Utc::now();
    let registry = TestRegistry::new().with(
        TaskKind::Intel,
        body_fn(|_ctx| Err(TaskError::recoverable("popup in the way"))),
    );
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::Intel), true, Some(now))],
        registry,
        StubAutomation::new(),
        fast_settings(),
    );

    assert_eq!(
        queue.run_once(now),
        TickOutcome::Executed {
            key: key(TaskKind::Intel),
            outcome: ExecutionOutcome::Recovered("popup in the way".to_string()),
        }
    );
    let view = queue.view(TaskKind::Intel, None, now).unwrap();
    assert_eq!(view.next_execution_time, Some(now));
    assert_eq!(view.last_execution_time, None);
    assert!(!view.executing);
    assert_eq!(queue.status(), QueueStatus::Active);

    assert!(matches!(queue.run_once(now + Duration::seconds(1)), TickOutcome::Blocked(_)));
    assert!(matches!(
        queue.run_once(now + Duration::seconds(6)),
        TickOutcome::Executed { .. }
    ));
}

#[test]
fn test_disconnect_is_recoverable() {
    let now = Utc::now();
    let registry = TestRegistry::new().with(
        TaskKind::OnlineReward,
        body_fn(|ctx| {
            ctx.automation().tap(botfleet_core::Point::new(1, 1))?;
            ctx.reschedule_in(Duration::hours(1));
            Ok(())
        }),
    );
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::OnlineReward), true, Some(now))],
        registry,
        StubAutomation::failing(AutomationError::Disconnected("adb offline".into())),
        fast_settings(),
    );

    match queue.run_once(now) {
        TickOutcome::Executed { outcome: ExecutionOutcome::Recovered(_), .. } => {}
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(queue.status(), QueueStatus::Active);
}

#[test]
fn test_missing_client_is_fatal_and_halts_queue() {
    let now = Utc::now();
    let registry = TestRegistry::new().with(
        TaskKind::OnlineReward,
        body_fn(|ctx| {
            ctx.automation().tap(botfleet_core::Point::new(1, 1))?;
            Ok(())
        }),
    );
    let (queue, _) = queue_with(
        vec![
            Task::new(key(TaskKind::OnlineReward), true, Some(now)),
            Task::new(key(TaskKind::Intel), true, Some(now)),
        ],
        registry,
        StubAutomation::failing(AutomationError::ClientMissing("game not installed".into())),
        fast_settings(),
    );

    match queue.run_once(now) {
        TickOutcome::Executed { outcome: ExecutionOutcome::Fatal(_), .. } => {}
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(matches!(queue.status(), QueueStatus::Halted(_)));
    assert!(matches!(queue.run_once(now), TickOutcome::Halted(_)));
    assert_eq!(queue.view(TaskKind::Intel, None, now).unwrap().last_execution_time, None);
}

#[test]
fn test_panicking_body_is_fatal() {
    let now = Utc::now();
    let registry = TestRegistry::new().with(
        TaskKind::Intel,
        body_fn(|_ctx| panic!("unexpected screen")),
    );
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::Intel), true, Some(now))],
        registry,
        StubAutomation::new(),
        fast_settings(),
    );

    match queue.run_once(now) {
        TickOutcome::Executed { outcome: ExecutionOutcome::Fatal(reason), .. } => {
            assert!(reason.contains("panicked"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(!queue.view(TaskKind::Intel, None, now).unwrap().executing);
    // The lease was released during unwinding.
    assert!(queue.execution().automation().acquire("after-panic").is_ok());
}

#[test]
fn test_panic_during_navigation_halts_and_clears_executing() {
    let now = Utc::now();
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::Intel), true, Some(now))],
        TestRegistry::new(),
        StubAutomation::panicking(),
        fast_settings(),
    );

    match queue.run_once(now) {
        TickOutcome::Executed { outcome: ExecutionOutcome::Fatal(reason), .. } => {
            assert!(reason.contains("panicked"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(matches!(queue.status(), QueueStatus::Halted(_)));
    assert!(queue.executing().is_none());
    assert!(matches!(queue.run_once(now), TickOutcome::Halted(_)));
    assert!(queue.execution().automation().acquire("after-panic").is_ok());
}

#[test]
fn test_duplicate_identity_is_rejected() {
    let now = Utc::now();
    let wood = TaskKey::with_distinct(1, TaskKind::Gather, "wood");
    let execution = || {
        botfleet_scheduler::ExecutionContext::new(
            Profile::new(1, "main"),
            Arc::new(StaticConfigStore::new()),
            Box::new(StubAutomation::new()),
            Arc::new(botfleet_core::InMemoryTaskRepository::new()),
            &fast_settings(),
        )
    };

    let result = botfleet_scheduler::TaskQueue::new(
        execution(),
        vec![
            Task::new(wood.clone(), true, Some(now)),
            Task::new(wood.clone(), false, None),
        ],
        Arc::new(TestRegistry::new()),
        fast_settings(),
    );
    match result {
        Err(SchedulerError::DuplicateTask(k)) => assert_eq!(k, wood.to_string()),
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("duplicate identity accepted"),
    }

    let queue = botfleet_scheduler::TaskQueue::new(
        execution(),
        vec![
            Task::new(wood, true, Some(now)),
            Task::new(TaskKey::with_distinct(1, TaskKind::Gather, "iron"), true, Some(now)),
        ],
        Arc::new(TestRegistry::new()),
        fast_settings(),
    )
    .unwrap();
    assert_eq!(queue.views(now).len(), 2);
}

#[test]
fn test_failed_navigation_is_recoverable() {
    let now = Utc::now();
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::Intel), true, Some(now))],
        TestRegistry::new(),
        StubAutomation::blind(),
        fast_settings(),
    );

    match queue.run_once(now) {
        TickOutcome::Executed { outcome: ExecutionOutcome::Recovered(_), .. } => {}
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_closed_gate_skips_unless_bypassed() {
    let now = Utc::now();
    let (queue, _) = queue_with(
        vec![
            Task::new(key(TaskKind::Intel), true, Some(now)),
            Task::new(key(TaskKind::MysteryShop), false, None),
        ],
        TestRegistry::new(),
        StubAutomation::new(),
        fast_settings(),
    );
    queue.execution().gate().close("maintenance");

    assert_eq!(queue.run_once(now), TickOutcome::Blocked("maintenance".to_string()));

    queue.execute_task_now(TaskKind::MysteryShop, true).unwrap();
    match queue.run_once(Utc::now()) {
        TickOutcome::Executed { key: k, .. } => assert_eq!(k.kind, TaskKind::MysteryShop),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(matches!(queue.run_once(Utc::now()), TickOutcome::Blocked(_)));

    queue.execution().gate().clear();
    assert!(matches!(queue.run_once(Utc::now()), TickOutcome::Executed { .. }));
}

#[test]
fn test_pause_and_resume() {
    let now = Utc::now();
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::Intel), true, Some(now))],
        TestRegistry::new(),
        StubAutomation::new(),
        fast_settings(),
    );
    queue.pause();
    assert_eq!(queue.run_once(now), TickOutcome::Paused);
    queue.resume();
    assert!(matches!(queue.run_once(now), TickOutcome::Executed { .. }));
}

#[test]
fn test_remove_and_schedule_now() {
    let now = Utc::now();
    let (queue, _) = queue_with(
        vec![Task::new(key(TaskKind::Intel), true, Some(now))],
        TestRegistry::new(),
        StubAutomation::new(),
        fast_settings(),
    );

    queue.remove_from_schedule(TaskKind::Intel, "intel").unwrap();
    assert_eq!(queue.run_once(now), TickOutcome::Idle);
    assert_eq!(queue.view(TaskKind::Intel, None, now).unwrap().state, TaskState::Idle);

    queue.schedule_now(TaskKind::Intel).unwrap();
    assert!(matches!(queue.run_once(Utc::now()), TickOutcome::Executed { .. }));
}

#[test]
fn test_removal_is_persisted_across_reactivation() {
    let config = all_disabled().with(1, ConfigKey::AllianceTechEnabled, ConfigValue::Bool(true));
    let repository = Arc::new(botfleet_core::InMemoryTaskRepository::new());
    let manager = QueueManager::new(
        Arc::new(TestRegistry::new()),
        Arc::new(config),
        repository.clone(),
        fast_settings(),
    );
    manager
        .prepare_profile(Profile::new(1, "main"), Box::new(StubAutomation::new()))
        .unwrap();

    manager
        .remove_from_schedule(1, TaskKind::AllianceTech, "alliance-tech")
        .unwrap();
    assert!(repository.find(&key(TaskKind::AllianceTech)).unwrap().unwrap().removed);
    manager.deactivate_profile(1).unwrap();

    let queue = manager
        .prepare_profile(Profile::new(1, "main"), Box::new(StubAutomation::new()))
        .unwrap();
    assert!(!queue.is_task_scheduled(TaskKind::AllianceTech));
    assert_eq!(queue.run_once(Utc::now()), TickOutcome::Idle);

    // Putting it back clears the flag for the next activation too.
    manager.schedule_now(1, TaskKind::AllianceTech).unwrap();
    assert!(!repository.find(&key(TaskKind::AllianceTech)).unwrap().unwrap().removed);
    assert!(matches!(queue.run_once(Utc::now()), TickOutcome::Executed { .. }));
}

#[test]
fn test_execute_now_targets_one_distinct_key() {
    let config = all_disabled()
        .with(1, ConfigKey::GatherEnabled, ConfigValue::Bool(true))
        .with(1, ConfigKey::GatherWood, ConfigValue::Bool(true))
        .with(1, ConfigKey::GatherIron, ConfigValue::Bool(true));
    let manager = QueueManager::new(
        Arc::new(TestRegistry::new()),
        Arc::new(config),
        Arc::new(botfleet_core::InMemoryTaskRepository::new()),
        fast_settings(),
    );
    let queue = manager
        .prepare_profile(Profile::new(1, "main"), Box::new(StubAutomation::new()))
        .unwrap();
    let tick = Utc::now();
    while let TickOutcome::Executed { .. } = queue.run_once(tick) {}

    assert_eq!(manager.execute_now(1, TaskKind::Gather, "wood", false).unwrap(), 1);
    let now = Utc::now();
    assert_eq!(
        queue.view(TaskKind::Gather, Some("wood"), now).unwrap().state,
        TaskState::Ready
    );
    assert_eq!(
        queue.view(TaskKind::Gather, Some("iron"), now).unwrap().state,
        TaskState::Scheduled
    );
    match queue.run_once(now) {
        TickOutcome::Executed { key: k, .. } => assert_eq!(k.distinct_key, "wood"),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(queue.run_once(Utc::now()), TickOutcome::Idle);

    assert!(matches!(
        manager.execute_now(1, TaskKind::Gather, "gold", false),
        Err(SchedulerError::TaskNotFound(_))
    ));
}

#[test]
fn test_views_follow_presentation_order() {
    let now = Utc::now();
    let (queue, _) = queue_with(
        vec![
            Task::new(key(TaskKind::MysteryShop), false, None),
            Task::new(key(TaskKind::AllianceChest), true, Some(now + Duration::hours(2))),
            Task::new(key(TaskKind::AllianceTech), true, Some(now + Duration::minutes(5))),
            Task::new(key(TaskKind::Intel), true, Some(now - Duration::minutes(1))),
        ],
        TestRegistry::new(),
        StubAutomation::new(),
        fast_settings(),
    );

    let order: Vec<TaskKind> = queue.views(now).into_iter().map(|v| v.key.kind).collect();
    assert_eq!(
        order,
        vec![
            TaskKind::Intel,
            TaskKind::AllianceTech,
            TaskKind::AllianceChest,
            TaskKind::MysteryShop,
        ]
    );
}

#[test]
fn test_sibling_schedule_is_readable_from_body() {
    let now = Utc::now();
    let wood_next = now + Duration::minutes(90);
    let observed = Arc::new(Mutex::new(None));
    let sink = observed.clone();
    let registry = TestRegistry::new().with(
        TaskKind::Intel,
        body_fn(move |ctx| {
            *sink.lock().unwrap() = ctx.next_execution_time(TaskKind::Gather, Some("wood"));
            ctx.reschedule_in(Duration::minutes(10));
            Ok(())
        }),
    );
    let (queue, _) = queue_with(
        vec![
            Task::new(key(TaskKind::Intel), true, Some(now)),
            Task::new(TaskKey::with_distinct(1, TaskKind::Gather, "wood"), true, Some(wood_next)),
        ],
        registry,
        StubAutomation::new(),
        fast_settings(),
    );

    queue.run_once(now);
    assert_eq!(*observed.lock().unwrap(), Some(wood_next));
}

#[test]
fn test_gather_variants_follow_enable_flags() {
    let now = Utc::now();
    let config = all_disabled()
        .with(1, ConfigKey::GatherEnabled, ConfigValue::Bool(true))
        .with(1, ConfigKey::GatherMeat, ConfigValue::Bool(false))
        .with(1, ConfigKey::GatherWood, ConfigValue::Bool(true))
        .with(1, ConfigKey::GatherIron, ConfigValue::Bool(true));

    let ran = Arc::new(Mutex::new(Vec::new()));
    let sink = ran.clone();
    let registry = TestRegistry::new().with(
        TaskKind::Gather,
        body_fn(move |ctx| {
            sink.lock().unwrap().push(ctx.distinct_key().to_string());
            ctx.reschedule_in(Duration::minutes(120));
            Ok(())
        }),
    );
    let repository = Arc::new(botfleet_core::InMemoryTaskRepository::new());
    let manager = QueueManager::new(
        Arc::new(registry),
        Arc::new(config),
        repository,
        fast_settings(),
    );
    let queue = manager
        .prepare_profile(Profile::new(1, "main"), Box::new(StubAutomation::new()))
        .unwrap();

    let tick = Utc::now();
    while let TickOutcome::Executed { .. } = queue.run_once(tick) {}

    let mut ran = ran.lock().unwrap().clone();
    ran.sort();
    assert_eq!(ran, vec!["iron".to_string(), "wood".to_string()]);

    for variant in ["wood", "iron"] {
        let next = queue.next_execution_time(TaskKind::Gather, Some(variant)).unwrap();
        assert_eq!(next, tick + Duration::minutes(120));
    }
    for variant in ["meat", "coal"] {
        let view = queue
            .view(TaskKind::Gather, Some(variant), now)
            .expect("disabled variants stay addressable");
        assert_eq!(view.state, TaskState::Idle);
    }
}

#[test]
fn test_schedule_survives_reactivation() {
    let target = Utc::now() + Duration::hours(3);
    let registry = TestRegistry::new().with(
        TaskKind::AllianceChest,
        body_fn(move |ctx| {
            ctx.reschedule(target);
            Ok(())
        }),
    );
    let config = all_disabled().with(1, ConfigKey::AllianceChestEnabled, ConfigValue::Bool(true));
    let repository = Arc::new(botfleet_core::InMemoryTaskRepository::new());
    let manager = QueueManager::new(
        Arc::new(registry),
        Arc::new(config),
        repository.clone(),
        fast_settings(),
    );

    let queue = manager
        .prepare_profile(Profile::new(1, "main"), Box::new(StubAutomation::new()))
        .unwrap();
    let started = Utc::now();
    assert!(matches!(queue.run_once(started), TickOutcome::Executed { .. }));
    manager.deactivate_profile(1).unwrap();
    assert!(manager.get_queue(1).is_none());

    let queue = manager
        .prepare_profile(Profile::new(1, "main"), Box::new(StubAutomation::new()))
        .unwrap();
    let view = queue.view(TaskKind::AllianceChest, None, Utc::now()).unwrap();
    assert_eq!(view.next_execution_time, Some(target));
    assert_eq!(view.last_execution_time, Some(started));
    assert_eq!(queue.run_once(Utc::now()), TickOutcome::Idle);
}

#[test]
fn test_cross_profile_trigger() {
    let registry = TestRegistry::new().with(
        TaskKind::DailyMissions,
        body_fn(|ctx| {
            if ctx.profile().id == 1 {
                let other = ctx
                    .queue_for(2)
                    .ok_or_else(|| TaskError::recoverable("profile 2 inactive"))?;
                other
                    .execute_task_now(TaskKind::MysteryShop, false)
                    .map_err(|e| TaskError::recoverable(e.to_string()))?;
            }
            ctx.reschedule_in(Duration::hours(1));
            Ok(())
        }),
    );
    let config = all_disabled()
        .with(1, ConfigKey::DailyMissionsEnabled, ConfigValue::Bool(true))
        .with(2, ConfigKey::MysteryShopEnabled, ConfigValue::Bool(true));
    let manager = QueueManager::new(
        Arc::new(registry),
        Arc::new(config),
        Arc::new(botfleet_core::InMemoryTaskRepository::new()),
        fast_settings(),
    );
    let first = manager
        .prepare_profile(Profile::new(1, "main"), Box::new(StubAutomation::new()))
        .unwrap();
    let second = manager
        .prepare_profile(Profile::new(2, "alt"), Box::new(StubAutomation::new()))
        .unwrap();

    assert_eq!(second.run_once(Utc::now()), TickOutcome::Idle);
    assert!(matches!(first.run_once(Utc::now()), TickOutcome::Executed { .. }));
    match second.run_once(Utc::now()) {
        TickOutcome::Executed { key: k, .. } => assert_eq!(k, TaskKey::new(2, TaskKind::MysteryShop)),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_duplicate_profile_is_rejected() {
    let manager = QueueManager::new(
        Arc::new(TestRegistry::new()),
        Arc::new(StaticConfigStore::new()),
        Arc::new(botfleet_core::InMemoryTaskRepository::new()),
        fast_settings(),
    );
    manager
        .prepare_profile(Profile::new(1, "main"), Box::new(StubAutomation::new()))
        .unwrap();
    let err = manager
        .prepare_profile(Profile::new(1, "again"), Box::new(StubAutomation::new()))
        .err()
        .unwrap();
    assert!(matches!(err, SchedulerError::ProfileAlreadyActive(1)));
    assert!(matches!(
        manager.deactivate_profile(9).unwrap_err(),
        SchedulerError::ProfileNotActive(9)
    ));
}
