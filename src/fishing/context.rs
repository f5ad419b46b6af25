//! Context resolution: turns a cast request plus ambient world state into an
//! immutable [`EncounterContext`].

use chrono::{NaiveTime, Timelike};

use super::error::CastError;
use super::types::EncounterContext;
use crate::core::constants::{DAWN_START_HOUR, DAY_START_HOUR, DUSK_START_HOUR, NIGHT_START_HOUR};
use crate::species::TimeOfDay;
use crate::world::{AnglerProfiles, WorldService};

/// Buckets a wall-clock time.
///
/// - Dawn: 05:00-07:59
/// - Day: 08:00-16:59
/// - Dusk: 17:00-19:59
/// - Night: 20:00-04:59
pub fn time_of_day_bucket(clock: NaiveTime) -> TimeOfDay {
    match clock.hour() {
        h if (DAWN_START_HOUR..DAY_START_HOUR).contains(&h) => TimeOfDay::Dawn,
        h if (DAY_START_HOUR..DUSK_START_HOUR).contains(&h) => TimeOfDay::Day,
        h if (DUSK_START_HOUR..NIGHT_START_HOUR).contains(&h) => TimeOfDay::Dusk,
        _ => TimeOfDay::Night,
    }
}

pub fn resolve_context(
    world: &dyn WorldService,
    profiles: &dyn AnglerProfiles,
    angler: &str,
    location_id: &str,
) -> Result<EncounterContext, CastError> {
    let location = world
        .location(location_id)
        .filter(|l| !l.water_types.is_empty())
        .ok_or_else(|| CastError::InvalidLocation(location_id.to_string()))?;

    let profile = profiles
        .profile(angler)
        .ok_or_else(|| CastError::UnknownAngler(angler.to_string()))?;

    Ok(EncounterContext {
        angler: angler.to_string(),
        time_of_day: time_of_day_bucket(world.clock(&location.id)),
        weather: world.weather(&location.id),
        location: location.id,
        water_types: location.water_types,
        bait: profile.loadout.bait,
        lure: profile.loadout.lure,
        rod: profile.loadout.rod,
        skill: profile.skill,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{WaterType, Weather};
    use crate::world::{AnglerProfile, ProfileDirectory, StaticWorld};

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    #[test]
    fn test_time_of_day_buckets() {
        assert_eq!(time_of_day_bucket(at(4, 59)), TimeOfDay::Night);
        assert_eq!(time_of_day_bucket(at(5, 0)), TimeOfDay::Dawn);
        assert_eq!(time_of_day_bucket(at(7, 59)), TimeOfDay::Dawn);
        assert_eq!(time_of_day_bucket(at(8, 0)), TimeOfDay::Day);
        assert_eq!(time_of_day_bucket(at(16, 59)), TimeOfDay::Day);
        assert_eq!(time_of_day_bucket(at(17, 0)), TimeOfDay::Dusk);
        assert_eq!(time_of_day_bucket(at(19, 59)), TimeOfDay::Dusk);
        assert_eq!(time_of_day_bucket(at(20, 0)), TimeOfDay::Night);
        assert_eq!(time_of_day_bucket(at(0, 0)), TimeOfDay::Night);
    }

    fn setup() -> (StaticWorld, ProfileDirectory) {
        let profiles = ProfileDirectory::new();
        let mut profile = AnglerProfile::default();
        profile.loadout.bait = Some("WORMS".to_string());
        profile.skill.hook = 25;
        profiles.insert("ana", profile);
        (StaticWorld::builtin(), profiles)
    }

    #[test]
    fn test_resolves_snapshot() {
        let (world, profiles) = setup();
        world.set_weather("WILLOW_RIVER", Weather::Rain);
        world.set_clock(at(21, 30));

        let ctx = resolve_context(&world, &profiles, "ana", "WILLOW_RIVER").expect("valid cast");
        assert_eq!(ctx.location, "WILLOW_RIVER");
        assert!(ctx.water_types.contains(&WaterType::River));
        assert!(ctx.water_types.contains(&WaterType::Stream));
        assert_eq!(ctx.weather, Weather::Rain);
        assert_eq!(ctx.time_of_day, TimeOfDay::Night);
        assert_eq!(ctx.bait.as_deref(), Some("WORMS"));
        assert_eq!(ctx.skill.hook, 25);
    }

    #[test]
    fn test_snapshot_ignores_later_world_changes() {
        let (world, profiles) = setup();
        let ctx = resolve_context(&world, &profiles, "ana", "MILL_POND").expect("valid cast");
        world.set_weather("MILL_POND", Weather::Storm);
        assert_eq!(ctx.weather, Weather::Clear);
    }

    #[test]
    fn test_unknown_location_rejected() {
        let (world, profiles) = setup();
        let err = resolve_context(&world, &profiles, "ana", "ATLANTIS").expect_err("unknown");
        assert_eq!(err, CastError::InvalidLocation("ATLANTIS".to_string()));
    }

    #[test]
    fn test_dry_location_rejected() {
        let (world, profiles) = setup();
        let err = resolve_context(&world, &profiles, "ana", "DUSTY_ROAD").expect_err("dry");
        assert_eq!(err, CastError::InvalidLocation("DUSTY_ROAD".to_string()));
    }

    #[test]
    fn test_unknown_angler_rejected() {
        let (world, profiles) = setup();
        let err = resolve_context(&world, &profiles, "bob", "MILL_POND").expect_err("no profile");
        assert_eq!(err, CastError::UnknownAngler("bob".to_string()));
    }
}
