//! Typed, read-only profile configuration.

use crate::profile::ProfileId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Closed key space of per-profile settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigKey {
    EmulatorSerial,
    MarchCount,
    StaminaRegenMinutes,
    OnlineRewardEnabled,
    IntelEnabled,
    IntelStaminaCost,
    GatherEnabled,
    GatherMeat,
    GatherWood,
    GatherCoal,
    GatherIron,
    GatherMinutes,
    GatherIntelGuardMinutes,
    AllianceChestEnabled,
    AllianceChestIntervalMinutes,
    AllianceTechEnabled,
    AllianceTechIntervalMinutes,
    DailyMissionsEnabled,
    ShopTriggerThreshold,
    MysteryShopEnabled,
}

impl ConfigKey {
    /// Value used when a profile does not set the key.
    pub fn default_value(self) -> ConfigValue {
        use ConfigKey::*;
        match self {
            EmulatorSerial => ConfigValue::Text("emulator-5554".to_string()),
            MarchCount => ConfigValue::Int(3),
            StaminaRegenMinutes => ConfigValue::Int(5),
            IntelStaminaCost => ConfigValue::Int(10),
            GatherMinutes => ConfigValue::Int(120),
            GatherIntelGuardMinutes => ConfigValue::Int(3),
            AllianceChestIntervalMinutes => ConfigValue::Int(120),
            AllianceTechIntervalMinutes => ConfigValue::Int(60),
            ShopTriggerThreshold => ConfigValue::Int(5),
            GatherCoal | GatherIron => ConfigValue::Bool(false),
            OnlineRewardEnabled | IntelEnabled | GatherEnabled | GatherMeat | GatherWood
            | AllianceChestEnabled | AllianceTechEnabled | DailyMissionsEnabled
            | MysteryShopEnabled => ConfigValue::Bool(true),
        }
    }

    /// Accepted range for integer keys; `None` for bool and text keys.
    pub fn int_range(self) -> Option<RangeInclusive<i64>> {
        use ConfigKey::*;
        match self {
            MarchCount => Some(0..=10),
            StaminaRegenMinutes => Some(1..=24 * 60),
            IntelStaminaCost => Some(1..=1_000),
            GatherMinutes | AllianceChestIntervalMinutes | AllianceTechIntervalMinutes => {
                Some(1..=7 * 24 * 60)
            }
            GatherIntelGuardMinutes => Some(0..=24 * 60),
            ShopTriggerThreshold => Some(0..=1_000),
            _ => None,
        }
    }

    /// Pull an integer into this key's range.
    pub fn clamp_int(self, value: i64) -> i64 {
        match self.int_range() {
            Some(range) => value.clamp(*range.start(), *range.end()),
            None => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Configuration lookup, read-only from the scheduler's side.
///
/// The typed accessors fall back to [`ConfigKey::default_value`] when the key
/// is unset or holds a value of the wrong type. Integers are clamped to
/// [`ConfigKey::int_range`].
pub trait ConfigStore: Send + Sync {
    fn get(&self, profile_id: ProfileId, key: ConfigKey) -> Option<ConfigValue>;

    fn get_bool(&self, profile_id: ProfileId, key: ConfigKey) -> bool {
        self.get(profile_id, key)
            .and_then(|v| v.as_bool())
            .or_else(|| key.default_value().as_bool())
            .unwrap_or(false)
    }

    fn get_int(&self, profile_id: ProfileId, key: ConfigKey) -> i64 {
        self.get(profile_id, key)
            .and_then(|v| v.as_int())
            .or_else(|| key.default_value().as_int())
            .map_or(0, |v| key.clamp_int(v))
    }

    fn get_text(&self, profile_id: ProfileId, key: ConfigKey) -> String {
        self.get(profile_id, key)
            .and_then(|v| v.as_text().map(str::to_string))
            .or_else(|| key.default_value().as_text().map(str::to_string))
            .unwrap_or_default()
    }
}

/// In-memory store built once at startup.
#[derive(Debug, Default, Clone)]
pub struct StaticConfigStore {
    values: HashMap<ProfileId, HashMap<ConfigKey, ConfigValue>>,
}

impl StaticConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, profile_id: ProfileId, key: ConfigKey, value: ConfigValue) {
        self.values.entry(profile_id).or_default().insert(key, value);
    }

    pub fn with(mut self, profile_id: ProfileId, key: ConfigKey, value: ConfigValue) -> Self {
        self.set(profile_id, key, value);
        self
    }

    pub fn insert_profile(&mut self, profile_id: ProfileId, values: HashMap<ConfigKey, ConfigValue>) {
        self.values.insert(profile_id, values);
    }
}

impl ConfigStore for StaticConfigStore {
    fn get(&self, profile_id: ProfileId, key: ConfigKey) -> Option<ConfigValue> {
        self.values.get(&profile_id)?.get(&key).cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let store = StaticConfigStore::new();
        assert_eq!(store.get_int(1, ConfigKey::MarchCount), 3);
        assert!(store.get_bool(1, ConfigKey::GatherMeat));
        assert!(!store.get_bool(1, ConfigKey::GatherIron));
        assert_eq!(store.get_text(1, ConfigKey::EmulatorSerial), "emulator-5554");
    }

    #[test]
    fn test_profile_values_are_isolated() {
        let store = StaticConfigStore::new()
            .with(1, ConfigKey::MarchCount, ConfigValue::Int(5))
            .with(2, ConfigKey::IntelEnabled, ConfigValue::Bool(false));

        assert_eq!(store.get_int(1, ConfigKey::MarchCount), 5);
        assert_eq!(store.get_int(2, ConfigKey::MarchCount), 3);
        assert!(store.get_bool(1, ConfigKey::IntelEnabled));
        assert!(!store.get_bool(2, ConfigKey::IntelEnabled));
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let store = StaticConfigStore::new().with(
            1,
            ConfigKey::MarchCount,
            ConfigValue::Text("lots".to_string()),
        );
        assert_eq!(store.get_int(1, ConfigKey::MarchCount), 3);
    }

    #[test]
    fn test_out_of_range_ints_are_clamped() {
        let store = StaticConfigStore::new()
            .with(1, ConfigKey::StaminaRegenMinutes, ConfigValue::Int(i64::MAX / 2))
            .with(1, ConfigKey::GatherMinutes, ConfigValue::Int(-40))
            .with(1, ConfigKey::MarchCount, ConfigValue::Int(i64::MIN));

        assert_eq!(store.get_int(1, ConfigKey::StaminaRegenMinutes), 24 * 60);
        assert_eq!(store.get_int(1, ConfigKey::GatherMinutes), 1);
        assert_eq!(store.get_int(1, ConfigKey::MarchCount), 0);
    }

    #[test]
    fn test_every_int_default_is_in_range() {
        for key in [
            ConfigKey::MarchCount,
            ConfigKey::StaminaRegenMinutes,
            ConfigKey::IntelStaminaCost,
            ConfigKey::GatherMinutes,
            ConfigKey::GatherIntelGuardMinutes,
            ConfigKey::AllianceChestIntervalMinutes,
            ConfigKey::AllianceTechIntervalMinutes,
            ConfigKey::ShopTriggerThreshold,
        ] {
            let default = key.default_value().as_int().unwrap();
            assert!(key.int_range().unwrap().contains(&default), "{:?}", key);
        }
        assert!(ConfigKey::IntelEnabled.int_range().is_none());
    }

    #[test]
    fn test_value_deserializes_untagged() {
        let values: HashMap<ConfigKey, ConfigValue> =
            serde_json::from_str(r#"{"march-count": 4, "intel-enabled": false, "emulator-serial": "x"}"#)
                .unwrap();
        assert_eq!(values[&ConfigKey::MarchCount], ConfigValue::Int(4));
        assert_eq!(values[&ConfigKey::IntelEnabled], ConfigValue::Bool(false));
        assert_eq!(values[&ConfigKey::EmulatorSerial], ConfigValue::Text("x".to_string()));
    }
}
