use serde::{Deserialize, Serialize};

pub type ProfileId = u32;

/// A configured bot identity. Its settings live in a [`crate::ConfigStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Display ordering among profiles; lower comes first.
    #[serde(default)]
    pub priority: u32,
}

fn default_enabled() -> bool {
    true
}

impl Profile {
    pub fn new(id: ProfileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            priority: 0,
        }
    }
}
