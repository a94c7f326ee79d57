//! Automation client that drives nothing and logs every call.

use botfleet_core::{Automation, AutomationError, Point, Region, Template, TemplateMatch};
use std::time::Duration;
use tracing::debug;

pub const SCREEN_CENTRE: Point = Point::new(360, 640);

/// Reports every template as visible at the screen centre and reads no text,
/// so bodies run their happy path without a device.
pub struct DryRunAutomation {
    serial: String,
    taps: usize,
}

impl DryRunAutomation {
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            taps: 0,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn taps(&self) -> usize {
        self.taps
    }
}

impl Automation for DryRunAutomation {
    fn tap(&mut self, point: Point) -> Result<(), AutomationError> {
        self.taps += 1;
        debug!("[{}] tap ({}, {})", self.serial, point.x, point.y);
        Ok(())
    }

    fn swipe(&mut self, from: Point, to: Point) -> Result<(), AutomationError> {
        debug!("[{}] swipe ({}, {}) -> ({}, {})", self.serial, from.x, from.y, to.x, to.y);
        Ok(())
    }

    fn find_template(&mut self, template: Template, _threshold: f32) -> Result<TemplateMatch, AutomationError> {
        debug!("[{}] find {}", self.serial, template.name());
        Ok(TemplateMatch::at(SCREEN_CENTRE, 1.0))
    }

    fn read_text(&mut self, _region: Region) -> Result<Option<String>, AutomationError> {
        Ok(None)
    }

    fn pace(&mut self, _duration: Duration) {}
}
