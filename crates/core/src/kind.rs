//! Static task catalog.

use crate::config::ConfigKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Screen the client must show before a body starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Location {
    Home,
    World,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Home => write!(f, "home"),
            Location::World => write!(f, "world"),
        }
    }
}

/// Category of automation. The set is closed; adding a kind means adding a
/// descriptor here and a body in the task catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    OnlineReward,
    Intel,
    Gather,
    AllianceChest,
    AllianceTech,
    DailyMissions,
    MysteryShop,
}

/// Independent instance of a kind, enabled by its own config flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub key: &'static str,
    pub enabled_by: ConfigKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    pub kind: TaskKind,
    pub recurring_by_default: bool,
    pub consumes_stamina: bool,
    pub contributes_daily_progress: bool,
    pub required_location: Option<Location>,
    pub enabled_by: ConfigKey,
    /// Distinct-key instances; empty means a single instance keyed by the kind.
    pub variants: &'static [Variant],
}

const GATHER_VARIANTS: &[Variant] = &[
    Variant { key: "meat", enabled_by: ConfigKey::GatherMeat },
    Variant { key: "wood", enabled_by: ConfigKey::GatherWood },
    Variant { key: "coal", enabled_by: ConfigKey::GatherCoal },
    Variant { key: "iron", enabled_by: ConfigKey::GatherIron },
];

impl TaskKind {
    /// Registration order used for tie-breaking.
    pub const ALL: [TaskKind; 7] = [
        TaskKind::OnlineReward,
        TaskKind::Intel,
        TaskKind::Gather,
        TaskKind::AllianceChest,
        TaskKind::AllianceTech,
        TaskKind::DailyMissions,
        TaskKind::MysteryShop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::OnlineReward => "online-reward",
            TaskKind::Intel => "intel",
            TaskKind::Gather => "gather",
            TaskKind::AllianceChest => "alliance-chest",
            TaskKind::AllianceTech => "alliance-tech",
            TaskKind::DailyMissions => "daily-missions",
            TaskKind::MysteryShop => "mystery-shop",
        }
    }

    pub fn parse(value: &str) -> Option<TaskKind> {
        TaskKind::ALL.into_iter().find(|k| k.as_str() == value)
    }

    pub fn descriptor(self) -> KindDescriptor {
        let base = KindDescriptor {
            kind: self,
            recurring_by_default: true,
            consumes_stamina: false,
            contributes_daily_progress: false,
            required_location: Some(Location::Home),
            enabled_by: ConfigKey::OnlineRewardEnabled,
            variants: &[],
        };
        match self {
            TaskKind::OnlineReward => base,
            TaskKind::Intel => KindDescriptor {
                consumes_stamina: true,
                contributes_daily_progress: true,
                required_location: Some(Location::World),
                enabled_by: ConfigKey::IntelEnabled,
                ..base
            },
            TaskKind::Gather => KindDescriptor {
                required_location: Some(Location::World),
                enabled_by: ConfigKey::GatherEnabled,
                variants: GATHER_VARIANTS,
                ..base
            },
            TaskKind::AllianceChest => KindDescriptor {
                contributes_daily_progress: true,
                enabled_by: ConfigKey::AllianceChestEnabled,
                ..base
            },
            TaskKind::AllianceTech => KindDescriptor {
                contributes_daily_progress: true,
                enabled_by: ConfigKey::AllianceTechEnabled,
                ..base
            },
            TaskKind::DailyMissions => KindDescriptor {
                enabled_by: ConfigKey::DailyMissionsEnabled,
                ..base
            },
            TaskKind::MysteryShop => KindDescriptor {
                recurring_by_default: false,
                required_location: None,
                enabled_by: ConfigKey::MysteryShopEnabled,
                ..base
            },
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
