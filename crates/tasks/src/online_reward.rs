use crate::common::{read_countdown, tap_when_visible, to_delay};
use crate::templates::{CLAIM_BUTTON, CLOSE_BUTTON, ONLINE_REWARD_CHEST, ONLINE_REWARD_TIMER};
use botfleet_core::TaskError;
use botfleet_scheduler::{TaskBody, TaskContext};
use chrono::Duration;
use tracing::{debug, info};

/// Stamina granted by one online reward chest.
pub const REWARD_STAMINA: i64 = 5;

/// Claims the online reward chest and follows its countdown.
#[derive(Debug, Default)]
pub struct OnlineReward;

impl TaskBody for OnlineReward {
    fn execute(&self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        if let Some(remaining) = read_countdown(ctx, ONLINE_REWARD_TIMER)? {
            if !remaining.is_zero() {
                debug!("Online reward for {} ready in {:?}", ctx.key(), remaining);
                ctx.reschedule_in(to_delay(remaining));
                return Ok(());
            }
        }

        if tap_when_visible(ctx, ONLINE_REWARD_CHEST, 2)? && tap_when_visible(ctx, CLAIM_BUTTON, 3)? {
            let stamina = ctx.services().stamina.add(REWARD_STAMINA);
            info!("Claimed online reward for profile {}, stamina now {}", ctx.profile().id, stamina);
            tap_when_visible(ctx, CLOSE_BUTTON, 1)?;
        }

        match read_countdown(ctx, ONLINE_REWARD_TIMER)? {
            Some(next) if !next.is_zero() => ctx.reschedule_in(to_delay(next)),
            _ => ctx.reschedule_in(Duration::minutes(15)),
        }
        Ok(())
    }
}
