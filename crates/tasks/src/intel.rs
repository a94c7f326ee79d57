use crate::common::{read_number, tap_sequence, tap_when_visible};
use crate::templates::{INTEL_BUTTON, INTEL_GO, INTEL_MISSION, STAMINA_TEXT};
use botfleet_core::{ConfigKey, TaskError};
use botfleet_scheduler::{TaskBody, TaskContext};
use chrono::Duration;
use tracing::{debug, info};

/// Runs one intel mission per execution while stamina lasts.
#[derive(Debug, Default)]
pub struct Intel;

impl TaskBody for Intel {
    fn execute(&self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let cost = ctx.config_int(ConfigKey::IntelStaminaCost);
        if let Some(observed) = read_number(ctx, STAMINA_TEXT)? {
            ctx.services().stamina.set(observed);
        }

        if !ctx.services().stamina.try_consume(cost) {
            let ready = ctx.services().stamina.estimate_ready(cost, ctx.now());
            debug!("Not enough stamina for intel on {}, waiting until {}", ctx.key(), ready);
            ctx.reschedule(ready);
            return Ok(());
        }

        if !tap_when_visible(ctx, INTEL_BUTTON, 2)? {
            ctx.services().stamina.add(cost);
            ctx.reschedule_in(Duration::minutes(10));
            return Ok(());
        }
        if !tap_sequence(ctx, &[INTEL_MISSION, INTEL_GO], 3)? {
            debug!("No intel mission available for {}", ctx.key());
            ctx.services().stamina.add(cost);
            ctx.reschedule_in(Duration::minutes(30));
            return Ok(());
        }

        let progress = ctx.services().daily_progress.add(1);
        info!(
            "Intel mission sent for profile {}, stamina left {}, daily progress {}",
            ctx.profile().id,
            ctx.services().stamina.get(),
            progress
        );
        ctx.reschedule_in(Duration::minutes(2));
        Ok(())
    }
}
