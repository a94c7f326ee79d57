//! Visual templates and OCR regions used by the bodies.

use botfleet_core::{Region, Template};

pub const CLAIM_BUTTON: Template = Template("buttons/claim.png");
pub const CLAIM_ALL_BUTTON: Template = Template("buttons/claim_all.png");
pub const CLOSE_BUTTON: Template = Template("buttons/close.png");
pub const CONFIRM_BUTTON: Template = Template("buttons/confirm.png");

pub const ONLINE_REWARD_CHEST: Template = Template("home/online_reward_chest.png");
pub const ONLINE_REWARD_TIMER: Region = Region::new(560, 410, 680, 440);

pub const STAMINA_TEXT: Region = Region::new(40, 120, 160, 150);
pub const INTEL_BUTTON: Template = Template("world/intel.png");
pub const INTEL_MISSION: Template = Template("world/intel_mission.png");
pub const INTEL_GO: Template = Template("world/intel_go.png");

pub const SEARCH_BUTTON: Template = Template("world/search.png");
pub const SEARCH_GO: Template = Template("world/search_go.png");
pub const GATHER_BUTTON: Template = Template("world/gather.png");
pub const MARCH_BUTTON: Template = Template("world/march.png");

pub const ALLIANCE_BUTTON: Template = Template("home/alliance.png");
pub const ALLIANCE_CHEST_TAB: Template = Template("alliance/chest_tab.png");
pub const ALLIANCE_TECH_TAB: Template = Template("alliance/tech_tab.png");
pub const ALLIANCE_RECOMMENDED_TECH: Template = Template("alliance/recommended.png");
pub const ALLIANCE_DONATE: Template = Template("alliance/donate.png");

pub const MISSIONS_BUTTON: Template = Template("home/missions.png");
pub const MISSIONS_DAILY_TAB: Template = Template("missions/daily_tab.png");

pub const SHOP_BUTTON: Template = Template("home/mystery_shop.png");
pub const SHOP_FREE_ITEM: Template = Template("shop/free_item.png");

/// Resource tile selector in the world search panel.
pub fn resource_tile(resource: &str) -> Option<Template> {
    match resource {
        "meat" => Some(Template("world/resource_meat.png")),
        "wood" => Some(Template("world/resource_wood.png")),
        "coal" => Some(Template("world/resource_coal.png")),
        "iron" => Some(Template("world/resource_iron.png")),
        _ => None,
    }
}
