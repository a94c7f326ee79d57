#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use botfleet_core::{
    Automation, AutomationError, ConfigKey, ConfigValue, InMemoryTaskRepository, Point, Profile,
    Region, StaticConfigStore, Task, TaskKind, Template, TemplateMatch,
};
use botfleet_scheduler::{
    body_fn, BodyRegistry, ExecutionContext, QueueSettings, TaskBody, TaskQueue,
};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Client that sees every template and records taps.
#[derive(Default)]
pub struct StubAutomation {
    pub taps: Arc<Mutex<Vec<Point>>>,
    pub fail_with: Option<AutomationError>,
    pub blind: bool,
    pub panic_on_find: bool,
}

impl StubAutomation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(err: AutomationError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }

    /// Panics on any template search, e.g. during navigation.
    pub fn panicking() -> Self {
        Self {
            panic_on_find: true,
            ..Self::default()
        }
    }

    /// Finds nothing, so location checks never succeed.
    pub fn blind() -> Self {
        Self {
            blind: true,
            ..Self::default()
        }
    }
}

impl Automation for StubAutomation {
    fn tap(&mut self, point: Point) -> Result<(), AutomationError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.taps.lock().unwrap().push(point);
        Ok(())
    }

    fn swipe(&mut self, _from: Point, _to: Point) -> Result<(), AutomationError> {
        Ok(())
    }

    fn find_template(&mut self, _template: Template, _threshold: f32) -> Result<TemplateMatch, AutomationError> {
        if self.panic_on_find {
            panic!("client crashed while searching for a template");
        }
        if self.blind {
            Ok(TemplateMatch::missing())
        } else {
            Ok(TemplateMatch::at(Point::new(100, 100), 0.99))
        }
    }

    fn read_text(&mut self, _region: Region) -> Result<Option<String>, AutomationError> {
        Ok(None)
    }

    fn pace(&mut self, _duration: std::time::Duration) {}
}

/// Bodies keyed by kind, falling back to "run again in an hour".
pub struct TestRegistry {
    bodies: HashMap<TaskKind, Box<dyn TaskBody>>,
    fallback: Box<dyn TaskBody>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self {
            bodies: HashMap::new(),
            fallback: body_fn(|ctx| {
                ctx.reschedule_in(Duration::hours(1));
                Ok(())
            }),
        }
    }

    pub fn with(mut self, kind: TaskKind, body: Box<dyn TaskBody>) -> Self {
        self.bodies.insert(kind, body);
        self
    }
}

impl BodyRegistry for TestRegistry {
    fn body(&self, kind: TaskKind) -> &dyn TaskBody {
        self.bodies
            .get(&kind)
            .map(|b| b.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }
}

pub fn fast_settings() -> QueueSettings {
    QueueSettings {
        tick_interval: std::time::Duration::from_millis(10),
        navigation_pacing: std::time::Duration::ZERO,
        resource_timeout: std::time::Duration::from_millis(200),
        ..QueueSettings::default()
    }
}

/// Config with every kind switched off.
pub fn all_disabled() -> StaticConfigStore {
    let mut config = StaticConfigStore::new();
    for key in [
        ConfigKey::OnlineRewardEnabled,
        ConfigKey::IntelEnabled,
        ConfigKey::GatherEnabled,
        ConfigKey::AllianceChestEnabled,
        ConfigKey::AllianceTechEnabled,
        ConfigKey::DailyMissionsEnabled,
        ConfigKey::MysteryShopEnabled,
    ] {
        for profile_id in 1..=4 {
            config.set(profile_id, key, ConfigValue::Bool(false));
        }
    }
    config
}

/// A queue for profile 1 over exactly `tasks`, not attached to a manager.
pub fn queue_with(
    tasks: Vec<Task>,
    registry: TestRegistry,
    automation: StubAutomation,
    settings: QueueSettings,
) -> (Arc<TaskQueue>, Arc<InMemoryTaskRepository>) {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let execution = ExecutionContext::new(
        Profile::new(1, "main"),
        Arc::new(StaticConfigStore::new()),
        Box::new(automation),
        repository.clone(),
        &settings,
    );
    let queue = TaskQueue::new(execution, tasks, Arc::new(registry), settings).unwrap();
    (Arc::new(queue), repository)
}
