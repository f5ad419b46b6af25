//! Collaborator interfaces the engine consumes: the world (locations, weather,
//! clock) and angler profiles (loadout and skill).
//!
//! The in-memory implementations here back the simulator and tests; a host
//! game wires its own services in behind the same traits.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::species::{ItemId, LocationId, WaterType, Weather};

pub type AnglerId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub water_types: BTreeSet<WaterType>,
}

impl Location {
    pub fn new(id: &str, name: &str, water_types: &[WaterType]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            water_types: water_types.iter().copied().collect(),
        }
    }
}

pub trait WorldService: Send + Sync {
    fn location(&self, id: &str) -> Option<Location>;
    fn weather(&self, location: &str) -> Weather;
    /// Local wall-clock time at the location.
    fn clock(&self, location: &str) -> NaiveTime;
}

/// Rod and reel modifiers. Bonuses add to the angler's skill in checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RodStats {
    /// Multiplies every candidate's bite weight.
    pub tier_multiplier: f64,
    pub hook_bonus: i32,
    pub reel_bonus: i32,
    /// Damps tension increases: factor `100 / (100 + line_strength)`.
    pub line_strength: u32,
}

impl Default for RodStats {
    fn default() -> Self {
        Self {
            tier_multiplier: 1.0,
            hook_bonus: 0,
            reel_bonus: 0,
            line_strength: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub bait: Option<ItemId>,
    pub lure: Option<ItemId>,
    pub rod: RodStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnglerSkill {
    pub hook: i32,
    pub reel: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnglerProfile {
    pub loadout: Loadout,
    pub skill: AnglerSkill,
}

pub trait AnglerProfiles: Send + Sync {
    fn profile(&self, angler: &str) -> Option<AnglerProfile>;
}

/// Fixed set of locations with adjustable weather and clock.
#[derive(Debug)]
pub struct StaticWorld {
    locations: HashMap<LocationId, Location>,
    conditions: RwLock<WorldConditions>,
}

#[derive(Debug, Clone)]
struct WorldConditions {
    default_weather: Weather,
    weather: HashMap<LocationId, Weather>,
    clock: NaiveTime,
}

impl StaticWorld {
    pub fn new(locations: Vec<Location>, weather: Weather, clock: NaiveTime) -> Self {
        Self {
            locations: locations.into_iter().map(|l| (l.id.clone(), l)).collect(),
            conditions: RwLock::new(WorldConditions {
                default_weather: weather,
                weather: HashMap::new(),
                clock,
            }),
        }
    }

    /// The builtin catalog's locations, clear skies at noon.
    pub fn builtin() -> Self {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
        Self::new(
            vec![
                Location::new("MILL_POND", "Mill Pond", &[WaterType::Pond]),
                Location::new("MISTY_LAKE", "Misty Lake", &[WaterType::Lake]),
                Location::new(
                    "WILLOW_RIVER",
                    "Willow River",
                    &[WaterType::River, WaterType::Stream],
                ),
                Location::new("SALT_DOCKS", "Salt Docks", &[WaterType::Ocean]),
                Location::new("BLACK_BOG", "Black Bog", &[WaterType::Swamp]),
                Location::new("ECHO_CAVERN", "Echo Cavern", &[WaterType::Cave]),
                Location::new("DUSTY_ROAD", "Dusty Road", &[]),
            ],
            Weather::Clear,
            noon,
        )
    }

    pub fn set_weather(&self, location: &str, weather: Weather) {
        let mut conditions = self.conditions.write().unwrap_or_else(PoisonError::into_inner);
        conditions.weather.insert(location.to_string(), weather);
    }

    pub fn set_default_weather(&self, weather: Weather) {
        let mut conditions = self.conditions.write().unwrap_or_else(PoisonError::into_inner);
        conditions.default_weather = weather;
        conditions.weather.clear();
    }

    pub fn set_clock(&self, clock: NaiveTime) {
        let mut conditions = self.conditions.write().unwrap_or_else(PoisonError::into_inner);
        conditions.clock = clock;
    }
}

impl WorldService for StaticWorld {
    fn location(&self, id: &str) -> Option<Location> {
        self.locations.get(id).cloned()
    }

    fn weather(&self, location: &str) -> Weather {
        let conditions = self.conditions.read().unwrap_or_else(PoisonError::into_inner);
        conditions
            .weather
            .get(location)
            .copied()
            .unwrap_or(conditions.default_weather)
    }

    fn clock(&self, _location: &str) -> NaiveTime {
        self.conditions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clock
    }
}

/// Mutable in-memory profile store.
#[derive(Debug, Default)]
pub struct ProfileDirectory {
    profiles: RwLock<HashMap<AnglerId, AnglerProfile>>,
}

impl ProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, angler: &str, profile: AnglerProfile) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(angler.to_string(), profile);
    }

    /// Swap the equipped bait; returns false if the angler is unknown.
    pub fn equip_bait(&self, angler: &str, bait: Option<&str>) -> bool {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        match profiles.get_mut(angler) {
            Some(profile) => {
                profile.loadout.bait = bait.map(str::to_string);
                true
            }
            None => false,
        }
    }
}

impl AnglerProfiles for ProfileDirectory {
    fn profile(&self, angler: &str) -> Option<AnglerProfile> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(angler)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_override_per_location() {
        let world = StaticWorld::builtin();
        assert_eq!(world.weather("MILL_POND"), Weather::Clear);
        world.set_weather("MILL_POND", Weather::Rain);
        assert_eq!(world.weather("MILL_POND"), Weather::Rain);
        assert_eq!(world.weather("MISTY_LAKE"), Weather::Clear);

        world.set_default_weather(Weather::Fog);
        assert_eq!(world.weather("MILL_POND"), Weather::Fog);
    }

    #[test]
    fn test_dry_location_has_no_water() {
        let world = StaticWorld::builtin();
        let road = world.location("DUSTY_ROAD").expect("road exists");
        assert!(road.water_types.is_empty());
        assert!(world.location("ATLANTIS").is_none());
    }

    #[test]
    fn test_profile_directory_equip_bait() {
        let profiles = ProfileDirectory::new();
        assert!(!profiles.equip_bait("nobody", Some("WORMS")));

        profiles.insert("ana", AnglerProfile::default());
        assert!(profiles.equip_bait("ana", Some("WORMS")));
        let profile = profiles.profile("ana").expect("ana exists");
        assert_eq!(profile.loadout.bait.as_deref(), Some("WORMS"));
        assert_eq!(profile.loadout.rod.tier_multiplier, 1.0);
    }
}
