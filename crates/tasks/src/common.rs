//! Recognition helpers shared by the bodies.

use botfleet_core::{parse_countdown, Region, TaskError, Template};
use botfleet_scheduler::{TaskContext, MATCH_THRESHOLD};
use std::time::Duration;
use tracing::debug;

/// Pause after every UI interaction so the client can redraw.
pub const UI_PACING: Duration = Duration::from_millis(600);

/// Tap `template` once it shows up, looking at most `attempts` times.
/// Returns false when it never appeared.
pub fn tap_when_visible(
    ctx: &mut TaskContext<'_>,
    template: Template,
    attempts: u32,
) -> Result<bool, TaskError> {
    for _ in 0..attempts {
        let found = ctx.automation().find_template(template, MATCH_THRESHOLD)?;
        if found.found {
            ctx.automation().tap(found.location)?;
            ctx.automation().pace(UI_PACING);
            return Ok(true);
        }
        ctx.automation().pace(UI_PACING);
    }
    debug!("{} never became visible", template.name());
    Ok(false)
}

/// Tap every template in order, stopping at the first that is missing.
pub fn tap_sequence(ctx: &mut TaskContext<'_>, steps: &[Template], attempts: u32) -> Result<bool, TaskError> {
    for step in steps {
        if !tap_when_visible(ctx, *step, attempts)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Tap `template` repeatedly while it stays visible, up to `limit` times.
pub fn tap_while_visible(ctx: &mut TaskContext<'_>, template: Template, limit: u32) -> Result<u32, TaskError> {
    let mut taps = 0;
    while taps < limit && tap_when_visible(ctx, template, 1)? {
        taps += 1;
    }
    Ok(taps)
}

pub fn read_countdown(ctx: &mut TaskContext<'_>, region: Region) -> Result<Option<Duration>, TaskError> {
    Ok(ctx.automation().read_text(region)?.as_deref().and_then(parse_countdown))
}

/// Leading integer of an OCR read such as `"85/120"`.
pub fn read_number(ctx: &mut TaskContext<'_>, region: Region) -> Result<Option<i64>, TaskError> {
    Ok(ctx.automation().read_text(region)?.as_deref().and_then(leading_number))
}

fn leading_number(text: &str) -> Option<i64> {
    let digits: String = text
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Convert a countdown to a schedule offset.
pub fn to_delay(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::hours(24))
}
