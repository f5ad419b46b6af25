//! Fish species reference data.
//!
//! A [`FishSpecies`] is immutable once loaded; the engine only ever reads it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub type SpeciesId = String;
pub type LocationId = String;
pub type ItemId = String;

/// Rarity tiers, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FishCategory {
    Freshwater,
    Saltwater,
    Brackish,
    Abyssal,
    Mythic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaterType {
    Pond,
    Lake,
    River,
    Stream,
    Ocean,
    Swamp,
    Cave,
}

/// Time-of-day buckets shared by species activity windows and the world clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOfDay {
    Dawn,
    Day,
    Dusk,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weather {
    Clear,
    Cloudy,
    Rain,
    Storm,
    Fog,
    Snow,
}

/// Preferred depth. Informational only; the engine does not model depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Depth {
    #[default]
    Shallow,
    Mid,
    Deep,
}

/// Weight bounds in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub record: f64,
}

impl WeightRange {
    /// Largest weight a catch may have: the range max, capped by the record.
    pub fn ceiling(&self) -> f64 {
        self.max.min(self.record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootEntry {
    pub item_id: ItemId,
    /// Probability in `[0, 1]` that this entry drops.
    pub chance: f64,
    pub quantity: QuantityRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FishSpecies {
    pub id: SpeciesId,
    pub name: String,
    pub rarity: Rarity,
    pub category: FishCategory,
    pub water_types: BTreeSet<WaterType>,
    pub locations: BTreeSet<LocationId>,
    pub active_time_of_day: BTreeSet<TimeOfDay>,
    /// Empty means the species bites in any weather.
    #[serde(default)]
    pub preferred_weather: BTreeSet<Weather>,
    #[serde(default)]
    pub depth: Depth,
    pub weight: WeightRange,
    /// Relative bite weight before multipliers.
    pub base_chance: f64,
    /// Expected wait before a bite, in milliseconds.
    pub bite_speed: u64,
    pub hook_difficulty: u32,
    /// Nominal fight length in milliseconds.
    pub base_fight_time: u64,
    pub fight_difficulty: u32,
    pub stamina: u32,
    pub aggression: u32,
    #[serde(default)]
    pub preferred_bait: BTreeSet<ItemId>,
    #[serde(default)]
    pub preferred_lures: BTreeSet<ItemId>,
    pub base_value: u32,
    pub experience: u32,
    #[serde(default)]
    pub is_legendary: bool,
    #[serde(default)]
    pub one_per_location: bool,
    #[serde(default)]
    pub requires_special_bait: bool,
    #[serde(default)]
    pub loot_table: Vec<LootEntry>,
}

impl FishSpecies {
    /// True if the equipped bait or lure is one this species prefers.
    pub fn prefers(&self, bait: Option<&str>, lure: Option<&str>) -> bool {
        bait.is_some_and(|b| self.preferred_bait.contains(b))
            || lure.is_some_and(|l| self.preferred_lures.contains(l))
    }

    /// Legendary species that can only ever be landed once per location.
    pub fn is_location_exclusive(&self) -> bool {
        self.is_legendary && self.one_per_location
    }

    pub fn lives_in(&self, location: &str, water: &BTreeSet<WaterType>) -> bool {
        self.locations.contains(location) && !self.water_types.is_disjoint(water)
    }
}
