use crate::common::{tap_sequence, tap_while_visible};
use crate::templates::{
    ALLIANCE_BUTTON, ALLIANCE_CHEST_TAB, ALLIANCE_DONATE, ALLIANCE_RECOMMENDED_TECH,
    ALLIANCE_TECH_TAB, CLAIM_ALL_BUTTON, CLOSE_BUTTON,
};
use botfleet_core::{ConfigKey, TaskError};
use botfleet_scheduler::{TaskBody, TaskContext};
use chrono::Duration;
use tracing::{debug, info};

const MAX_DONATIONS: u32 = 20;

fn interval(ctx: &TaskContext<'_>, key: ConfigKey) -> Duration {
    Duration::minutes(ctx.config_int(key))
}

/// Opens the alliance chest tab and claims everything.
#[derive(Debug, Default)]
pub struct AllianceChest;

impl TaskBody for AllianceChest {
    fn execute(&self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let every = interval(ctx, ConfigKey::AllianceChestIntervalMinutes);
        if !tap_sequence(ctx, &[ALLIANCE_BUTTON, ALLIANCE_CHEST_TAB], 3)? {
            debug!("Alliance chests not reachable for {}", ctx.key());
            ctx.reschedule_in(every);
            return Ok(());
        }

        let claimed = tap_while_visible(ctx, CLAIM_ALL_BUTTON, 1)?;
        if claimed > 0 {
            let progress = ctx.services().daily_progress.add(1);
            info!("Claimed alliance chests for profile {}, daily progress {}", ctx.profile().id, progress);
        }
        tap_while_visible(ctx, CLOSE_BUTTON, 2)?;
        ctx.reschedule_in(every);
        Ok(())
    }
}

/// Donates to the recommended alliance technology.
#[derive(Debug, Default)]
pub struct AllianceTech;

impl TaskBody for AllianceTech {
    fn execute(&self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let every = interval(ctx, ConfigKey::AllianceTechIntervalMinutes);
        if !tap_sequence(ctx, &[ALLIANCE_BUTTON, ALLIANCE_TECH_TAB, ALLIANCE_RECOMMENDED_TECH], 3)? {
            debug!("Alliance tech not reachable for {}", ctx.key());
            ctx.reschedule_in(every);
            return Ok(());
        }

        let donations = tap_while_visible(ctx, ALLIANCE_DONATE, MAX_DONATIONS)?;
        if donations > 0 {
            let progress = ctx.services().daily_progress.add(1);
            info!(
                "Donated {} times to alliance tech for profile {}, daily progress {}",
                donations,
                ctx.profile().id,
                progress
            );
        }
        tap_while_visible(ctx, CLOSE_BUTTON, 2)?;
        ctx.reschedule_in(every);
        Ok(())
    }
}
