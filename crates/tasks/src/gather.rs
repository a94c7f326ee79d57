use crate::common::tap_sequence;
use crate::templates::{resource_tile, GATHER_BUTTON, MARCH_BUTTON, SEARCH_BUTTON, SEARCH_GO};
use botfleet_core::{ConfigKey, TaskError, TaskKind};
use botfleet_scheduler::{TaskBody, TaskContext};
use chrono::Duration;
use tracing::{debug, info, warn};

/// Sends one march to gather the resource named by the task's distinct key.
#[derive(Debug, Default)]
pub struct Gather;

impl TaskBody for Gather {
    fn execute(&self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let now = ctx.now();
        let resource = ctx.distinct_key().to_string();
        let Some(tile) = resource_tile(&resource) else {
            warn!("Unknown gather resource {} on {}", resource, ctx.key());
            ctx.set_recurring(false);
            return Ok(());
        };

        // Intel about to run takes the screen first.
        let guard = Duration::minutes(ctx.config_int(ConfigKey::GatherIntelGuardMinutes));
        if ctx.is_task_scheduled(TaskKind::Intel) {
            if let Some(intel_next) = ctx.next_execution_time(TaskKind::Intel, None) {
                if intel_next > now && intel_next - now <= guard {
                    debug!("Deferring {} until intel at {} finishes", ctx.key(), intel_next);
                    ctx.reschedule(intel_next.checked_add_signed(guard).unwrap_or(intel_next));
                    return Ok(());
                }
            }
        }

        if let Some(free_at) = ctx.services().marches.next_free_at(now) {
            debug!("No free march for {}, next at {}", ctx.key(), free_at);
            ctx.reschedule(free_at);
            return Ok(());
        }

        if !tap_sequence(ctx, &[SEARCH_BUTTON, tile, SEARCH_GO, GATHER_BUTTON, MARCH_BUTTON], 3)? {
            debug!("Could not dispatch a march for {}", ctx.key());
            ctx.reschedule_in(Duration::minutes(5));
            return Ok(());
        }

        let trip = Duration::minutes(ctx.config_int(ConfigKey::GatherMinutes));
        if !ctx.services().marches.occupy(now, now + trip) {
            ctx.reschedule_in(Duration::minutes(5));
            return Ok(());
        }
        info!("March sent to gather {} for profile {}", resource, ctx.profile().id);
        ctx.reschedule_in(trip);
        Ok(())
    }
}
