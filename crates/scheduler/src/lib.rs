//! Per-profile task queues: selection, serialized execution, gating and
//! cross-task triggering.

pub mod body;
pub mod context;
pub mod error;
pub mod gate;
pub mod manager;
pub mod metrics;
pub mod navigation;
pub mod queue;
pub mod resource;
pub mod settings;

pub use body::{body_fn, BodyRegistry, TaskBody};
pub use context::{ExecutionContext, TaskContext};
pub use error::{ResourceError, SchedulerError};
pub use gate::{GateStatus, ProfileGate};
pub use manager::{ProfileSummary, QueueManager};
pub use navigation::{ensure_location, MATCH_THRESHOLD};
pub use queue::{build_tasks, ExecutionOutcome, QueueStatus, TaskQueue, TickOutcome};
pub use resource::{ExclusiveResource, ResourceLease};
pub use settings::QueueSettings;
