//! Botfleet core domain: profiles, the task catalog, the task state machine
//! and the boundary traits the scheduler consumes.

pub mod automation;
pub mod config;
pub mod error;
pub mod kind;
pub mod ordering;
pub mod profile;
pub mod repository;
pub mod services;
pub mod task;

pub use automation::{parse_countdown, Automation, Point, Region, Template, TemplateMatch};
pub use config::{ConfigKey, ConfigStore, ConfigValue, StaticConfigStore};
pub use error::{AutomationError, RepositoryError, TaskError};
pub use kind::{KindDescriptor, Location, TaskKind, Variant};
pub use ordering::{compare_for_display, sort_for_display, TaskView};
pub use profile::{Profile, ProfileId};
pub use repository::{InMemoryTaskRepository, TaskRecord, TaskRepository};
pub use services::{DailyProgress, MarchService, ProfileServices, StaminaService};
pub use task::{select_due, ScheduleDecision, Task, TaskKey, TaskState, Trigger};
