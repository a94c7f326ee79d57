//! Bring the client to a task's required start screen.

use botfleet_core::{Automation, Location, Point, TaskError};
use std::time::Duration;
use tracing::debug;

pub const MATCH_THRESHOLD: f32 = 0.9;

/// Tapping here dismisses most dialogs covering the anchors.
pub const BACK_POINT: Point = Point::new(40, 40);

/// Checks the anchor first; otherwise switches screens with bounded retries.
pub fn ensure_location(
    automation: &mut dyn Automation,
    target: Location,
    attempts: u32,
    pacing: Duration,
) -> Result<(), TaskError> {
    for attempt in 0..attempts {
        if automation.find_template(target.anchor(), MATCH_THRESHOLD)?.found {
            return Ok(());
        }

        let switch = automation.find_template(target.switch_button(), MATCH_THRESHOLD)?;
        if switch.found {
            debug!("Switching to {} screen (attempt {})", target, attempt + 1);
            automation.tap(switch.location)?;
        } else {
            debug!("No {} switch visible, dismissing overlay", target);
            automation.tap(BACK_POINT)?;
        }
        automation.pace(pacing);
    }

    if automation.find_template(target.anchor(), MATCH_THRESHOLD)?.found {
        return Ok(());
    }
    Err(TaskError::recoverable(format!(
        "could not reach {} screen after {} attempts",
        target, attempts
    )))
}
