use crate::context::TaskContext;
use botfleet_core::{TaskError, TaskKind};

/// Per-kind behavior run by the queue loop.
///
/// A body must record exactly one scheduling decision through its context
/// (`reschedule*` or `set_recurring(false)`) before returning `Ok`. Returning
/// without one triggers the queue's default-retry safety net.
pub trait TaskBody: Send + Sync {
    fn execute(&self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError>;
}

impl<F> TaskBody for F
where
    F: Fn(&mut TaskContext<'_>) -> Result<(), TaskError> + Send + Sync,
{
    fn execute(&self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self(ctx)
    }
}

/// Closed table mapping every kind to its body.
pub trait BodyRegistry: Send + Sync {
    fn body(&self, kind: TaskKind) -> &dyn TaskBody;
}

/// Box a closure as a body, fixing its signature for inference.
pub fn body_fn<F>(f: F) -> Box<dyn TaskBody>
where
    F: Fn(&mut TaskContext<'_>) -> Result<(), TaskError> + Send + Sync + 'static,
{
    Box::new(f)
}
