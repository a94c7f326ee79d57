use crate::common::{tap_when_visible, tap_while_visible};
use crate::templates::{CLOSE_BUTTON, CONFIRM_BUTTON, SHOP_BUTTON, SHOP_FREE_ITEM};
use botfleet_core::TaskError;
use botfleet_scheduler::{TaskBody, TaskContext};
use tracing::info;

const MAX_PURCHASES: u32 = 6;

/// One-shot visit to the mystery shop, collecting the free items. Runs only
/// when triggered.
#[derive(Debug, Default)]
pub struct MysteryShop;

impl TaskBody for MysteryShop {
    fn execute(&self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        if tap_when_visible(ctx, SHOP_BUTTON, 3)? {
            let mut bought = 0;
            while bought < MAX_PURCHASES && tap_when_visible(ctx, SHOP_FREE_ITEM, 1)? {
                tap_when_visible(ctx, CONFIRM_BUTTON, 2)?;
                bought += 1;
            }
            info!("Collected {} free shop items for profile {}", bought, ctx.profile().id);
            tap_while_visible(ctx, CLOSE_BUTTON, 2)?;
        }
        ctx.set_recurring(false);
        Ok(())
    }
}
