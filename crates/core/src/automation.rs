//! Boundary to the emulator/recognition layer.

use crate::error::AutomationError;
use crate::kind::Location;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Region {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            top_left: Point::new(x1, y1),
            bottom_right: Point::new(x2, y2),
        }
    }
}

/// Named visual template known to the recognition layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Template(pub &'static str);

impl Template {
    pub fn name(&self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    pub found: bool,
    pub location: Point,
    pub confidence: f32,
}

impl TemplateMatch {
    pub fn missing() -> Self {
        Self {
            found: false,
            location: Point::default(),
            confidence: 0.0,
        }
    }

    pub fn at(location: Point, confidence: f32) -> Self {
        Self {
            found: true,
            location,
            confidence,
        }
    }
}

/// Blocking operations against one emulated client.
///
/// The scheduler never calls these itself except for location checks; it
/// only hands the exclusive handle to one body at a time.
pub trait Automation: Send {
    fn tap(&mut self, point: Point) -> Result<(), AutomationError>;

    fn swipe(&mut self, from: Point, to: Point) -> Result<(), AutomationError>;

    fn find_template(&mut self, template: Template, threshold: f32) -> Result<TemplateMatch, AutomationError>;

    /// OCR over a screen region. `None` when nothing legible was found.
    fn read_text(&mut self, region: Region) -> Result<Option<String>, AutomationError>;

    fn pace(&mut self, duration: Duration);
}

impl Location {
    /// Visible only while the client shows this screen.
    pub fn anchor(self) -> Template {
        match self {
            Location::Home => Template("anchors/home_city.png"),
            Location::World => Template("anchors/world_map.png"),
        }
    }

    /// Button that switches to this screen from the other one.
    pub fn switch_button(self) -> Template {
        match self {
            Location::Home => Template("buttons/to_city.png"),
            Location::World => Template("buttons/to_world.png"),
        }
    }
}

/// Parse an `HH:MM:SS` or `MM:SS` countdown as read by OCR.
pub fn parse_countdown(text: &str) -> Option<Duration> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .collect();
    let parts: Vec<u64> = cleaned
        .split(':')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let secs = match parts.as_slice() {
        [h, m, s] if *m < 60 && *s < 60 => h * 3600 + m * 60 + s,
        [m, s] if *s < 60 => m * 60 + s,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}
