//! Task bodies, one per [`TaskKind`].

pub mod alliance;
pub mod common;
pub mod daily;
pub mod gather;
pub mod intel;
pub mod online_reward;
pub mod shop;
pub mod templates;

use botfleet_core::TaskKind;
use botfleet_scheduler::{BodyRegistry, TaskBody};

pub use alliance::{AllianceChest, AllianceTech};
pub use daily::DailyMissions;
pub use gather::Gather;
pub use intel::Intel;
pub use online_reward::OnlineReward;
pub use shop::MysteryShop;

/// Build-time table of every body. Adding a [`TaskKind`] without a body here
/// fails to compile.
#[derive(Default)]
pub struct Catalog {
    online_reward: OnlineReward,
    intel: Intel,
    gather: Gather,
    alliance_chest: AllianceChest,
    alliance_tech: AllianceTech,
    daily_missions: DailyMissions,
    mystery_shop: MysteryShop,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BodyRegistry for Catalog {
    fn body(&self, kind: TaskKind) -> &dyn TaskBody {
        match kind {
            TaskKind::OnlineReward => &self.online_reward,
            TaskKind::Intel => &self.intel,
            TaskKind::Gather => &self.gather,
            TaskKind::AllianceChest => &self.alliance_chest,
            TaskKind::AllianceTech => &self.alliance_tech,
            TaskKind::DailyMissions => &self.daily_missions,
            TaskKind::MysteryShop => &self.mystery_shop,
        }
    }
}
