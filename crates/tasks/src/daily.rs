use crate::common::{tap_sequence, tap_while_visible};
use crate::templates::{CLAIM_BUTTON, CLOSE_BUTTON, MISSIONS_BUTTON, MISSIONS_DAILY_TAB};
use botfleet_core::{ConfigKey, TaskError, TaskKind};
use botfleet_scheduler::{TaskBody, TaskContext};
use chrono::Duration;
use tracing::{info, warn};

const MAX_CLAIMS: u32 = 10;

/// Claims finished daily missions and opens the mystery shop once enough
/// progress has accumulated.
#[derive(Debug, Default)]
pub struct DailyMissions;

impl TaskBody for DailyMissions {
    fn execute(&self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        if tap_sequence(ctx, &[MISSIONS_BUTTON, MISSIONS_DAILY_TAB], 3)? {
            let claimed = tap_while_visible(ctx, CLAIM_BUTTON, MAX_CLAIMS)?;
            if claimed > 0 {
                info!("Claimed {} daily missions for profile {}", claimed, ctx.profile().id);
            }
            tap_while_visible(ctx, CLOSE_BUTTON, 2)?;
        }

        let threshold = u32::try_from(ctx.config_int(ConfigKey::ShopTriggerThreshold)).unwrap_or(u32::MAX);
        let progress = ctx.services().daily_progress.get();
        if progress >= threshold && ctx.config_bool(ConfigKey::MysteryShopEnabled) {
            match ctx.trigger(TaskKind::MysteryShop, false) {
                Ok(_) => {
                    info!("Daily progress {} reached, opening mystery shop for profile {}", progress, ctx.profile().id);
                    ctx.services().daily_progress.reset();
                }
                Err(e) => warn!("Could not trigger mystery shop for {}: {}", ctx.key(), e),
            }
        }

        ctx.reschedule_in(Duration::hours(1));
        Ok(())
    }
}
