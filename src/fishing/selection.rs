//! Candidate selection: which fish might bite this cast, and how likely each is.
//!
//! Selection is a pure filter over the catalog followed by a single draw from
//! the cumulative distribution. The RNG is the only source of randomness.

use rand::Rng;

use super::error::CastError;
use super::ledger::LegendaryLedger;
use super::types::{Draw, EncounterContext};
use crate::core::config::{NoBiteWeight, SelectionConfig};
use crate::species::{FishSpecies, SpeciesCatalog};

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub draw: Draw,
    pub weight: f64,
}

/// Weighted outcomes for one cast: species in catalog order, "no bite" last.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    entries: Vec<Candidate>,
}

impl CandidateSet {
    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|c| c.weight).sum()
    }

    pub fn species_weight(&self, id: &str) -> Option<f64> {
        self.entries.iter().find_map(|c| match &c.draw {
            Draw::Species(s) if s == id => Some(c.weight),
            _ => None,
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.species_weight(id).is_some()
    }

    pub fn no_bite_weight(&self) -> f64 {
        self.entries
            .iter()
            .filter(|c| c.draw == Draw::NoBite)
            .map(|c| c.weight)
            .sum()
    }

    /// Number of species entries (excluding "no bite").
    pub fn species_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|c| matches!(c.draw, Draw::Species(_)))
            .count()
    }

    /// One uniform draw over the cumulative weights.
    pub fn draw(&self, rng: &mut impl Rng) -> Draw {
        let total = self.total_weight();
        if total <= 0.0 {
            return Draw::NoBite;
        }

        let roll = rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        for candidate in &self.entries {
            cumulative += candidate.weight;
            if roll < cumulative {
                return candidate.draw.clone();
            }
        }

        // Float rounding can leave the roll at the very top of the range
        self.entries
            .iter()
            .rev()
            .find(|c| c.weight > 0.0)
            .map(|c| c.draw.clone())
            .unwrap_or(Draw::NoBite)
    }
}

fn bites_now(species: &FishSpecies, ctx: &EncounterContext) -> bool {
    species.active_time_of_day.contains(&ctx.time_of_day)
        && (species.preferred_weather.is_empty()
            || species.preferred_weather.contains(&ctx.weather))
}

/// Build the weighted candidate set for a context.
///
/// Fails with [`CastError::NoViableWater`] when no species lives in this
/// location's water at all, before time, weather, ledger or bait filtering.
pub fn select_candidates(
    catalog: &dyn SpeciesCatalog,
    ctx: &EncounterContext,
    ledger: &LegendaryLedger,
    config: &SelectionConfig,
) -> Result<CandidateSet, CastError> {
    let resident = catalog.at_location(&ctx.location, &ctx.water_types);
    if resident.is_empty() {
        return Err(CastError::NoViableWater(ctx.location.clone()));
    }

    let bait = ctx.bait.as_deref();
    let lure = ctx.lure.as_deref();

    let mut entries: Vec<Candidate> = resident
        .into_iter()
        .filter(|species| bites_now(species, ctx))
        .filter(|species| {
            !(species.is_location_exclusive() && ledger.is_claimed(&species.id, &ctx.location))
        })
        .filter(|species| !species.requires_special_bait || species.prefers(bait, lure))
        .map(|species| {
            let bait_multiplier = if species.prefers(bait, lure) {
                config.bait_match_multiplier
            } else {
                1.0
            };
            Candidate {
                draw: Draw::Species(species.id.clone()),
                weight: species.base_chance * bait_multiplier * ctx.rod.tier_multiplier,
            }
        })
        .collect();

    let species_total: f64 = entries.iter().map(|c| c.weight).sum();
    let mut no_bite = match config.no_bite {
        NoBiteWeight::Proportional(share) => species_total * share,
        NoBiteWeight::Fixed(weight) => weight,
    };
    if species_total + no_bite <= 0.0 {
        no_bite = config.no_bite_floor;
    }
    entries.push(Candidate {
        draw: Draw::NoBite,
        weight: no_bite,
    });

    tracing::debug!(
        target: "angler::selection",
        location = %ctx.location,
        candidates = entries.len() - 1,
        species_weight = species_total,
        no_bite_weight = no_bite,
        "candidates.selected"
    );

    Ok(CandidateSet { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fishing::context::resolve_context;
    use crate::species::{InMemoryCatalog, TimeOfDay, Weather};
    use crate::world::{AnglerProfile, ProfileDirectory, StaticWorld};
    use chrono::NaiveTime;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn context(location: &str, bait: Option<&str>, hour: u32, weather: Weather) -> EncounterContext {
        let world = StaticWorld::builtin();
        world.set_clock(NaiveTime::from_hms_opt(hour, 0, 0).expect("valid hour"));
        world.set_default_weather(weather);
        let profiles = ProfileDirectory::new();
        let mut profile = AnglerProfile::default();
        profile.loadout.bait = bait.map(str::to_string);
        profiles.insert("ana", profile);
        resolve_context(&world, &profiles, "ana", location).expect("valid context")
    }

    #[test]
    fn test_filters_by_time_of_day() {
        let catalog = InMemoryCatalog::builtin();
        let ledger = LegendaryLedger::new();
        let config = SelectionConfig::default();

        let noon = context("MISTY_LAKE", None, 12, Weather::Clear);
        let set = select_candidates(&catalog, &noon, &ledger, &config).expect("lake has fish");
        assert!(set.contains("BLUEGILL"));
        assert!(!set.contains("CHANNEL_CATFISH"));

        let night = context("MISTY_LAKE", None, 23, Weather::Clear);
        assert_eq!(night.time_of_day, TimeOfDay::Night);
        let set = select_candidates(&catalog, &night, &ledger, &config).expect("lake has fish");
        assert!(!set.contains("BLUEGILL"));
        assert!(set.contains("CHANNEL_CATFISH"));
    }

    #[test]
    fn test_weather_preference_and_agnostic_species() {
        let catalog = InMemoryCatalog::builtin();
        let ledger = LegendaryLedger::new();
        let config = SelectionConfig::default();

        let clear = context("SALT_DOCKS", None, 12, Weather::Clear);
        let set = select_candidates(&catalog, &clear, &ledger, &config).expect("docks have fish");
        assert!(set.contains("MACKEREL"));
        assert!(!set.contains("STORM_MARLIN"));

        let storm = context("SALT_DOCKS", None, 12, Weather::Storm);
        let set = select_candidates(&catalog, &storm, &ledger, &config).expect("docks have fish");
        assert!(set.contains("MACKEREL"));
        assert!(set.contains("STORM_MARLIN"));
    }

    #[test]
    fn test_bait_match_multiplier() {
        let catalog = InMemoryCatalog::builtin();
        let ledger = LegendaryLedger::new();
        let config = SelectionConfig::default();

        let plain = context("MILL_POND", None, 12, Weather::Clear);
        let set = select_candidates(&catalog, &plain, &ledger, &config).expect("pond");
        assert_eq!(set.species_weight("BLUEGILL"), Some(35.0));

        let wormed = context("MILL_POND", Some("WORMS"), 12, Weather::Clear);
        let set = select_candidates(&catalog, &wormed, &ledger, &config).expect("pond");
        assert_eq!(set.species_weight("BLUEGILL"), Some(52.5));
    }

    #[test]
    fn test_rod_tier_multiplier() {
        let catalog = InMemoryCatalog::builtin();
        let ledger = LegendaryLedger::new();
        let mut ctx = context("MILL_POND", None, 12, Weather::Clear);
        ctx.rod.tier_multiplier = 2.0;
        let set = select_candidates(&catalog, &ctx, &ledger, &SelectionConfig::default())
            .expect("pond");
        assert_eq!(set.species_weight("BLUEGILL"), Some(70.0));
    }

    #[test]
    fn test_no_bite_is_proportional_by_default() {
        let catalog = InMemoryCatalog::builtin();
        let ledger = LegendaryLedger::new();
        let ctx = context("MILL_POND", None, 12, Weather::Clear);
        let set = select_candidates(&catalog, &ctx, &ledger, &SelectionConfig::default())
            .expect("pond");
        // Only bluegill bites at the pond at noon in clear weather
        assert_eq!(set.species_count(), 1);
        assert!((set.no_bite_weight() - 10.5).abs() < 1e-9);
        assert_eq!(set.entries().last().map(|c| &c.draw), Some(&Draw::NoBite));
    }

    #[test]
    fn test_empty_context_falls_back_to_no_bite_floor() {
        let catalog = InMemoryCatalog::builtin();
        let ledger = LegendaryLedger::new();
        // Nothing at the pond bites at night
        let ctx = context("MILL_POND", None, 2, Weather::Clear);
        let set = select_candidates(&catalog, &ctx, &ledger, &SelectionConfig::default())
            .expect("pond still has resident species");
        assert_eq!(set.species_count(), 0);
        assert_eq!(set.no_bite_weight(), 1.0);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(set.draw(&mut rng), Draw::NoBite);
    }

    #[test]
    fn test_no_viable_water() {
        let catalog = InMemoryCatalog::new(vec![]).expect("empty catalog");
        let ledger = LegendaryLedger::new();
        let ctx = context("MILL_POND", None, 12, Weather::Clear);
        let err = select_candidates(&catalog, &ctx, &ledger, &SelectionConfig::default())
            .expect_err("nothing lives here");
        assert_eq!(err, CastError::NoViableWater("MILL_POND".to_string()));
    }

    #[test]
    fn test_claimed_legendary_excluded() {
        let catalog = InMemoryCatalog::builtin();
        let ledger = LegendaryLedger::new();
        let config = SelectionConfig::default();
        let ctx = context("WILLOW_RIVER", None, 23, Weather::Rain);

        let set = select_candidates(&catalog, &ctx, &ledger, &config).expect("river");
        assert!(set.contains("OLD_WHISKERS"));

        assert!(ledger.try_claim("OLD_WHISKERS", "WILLOW_RIVER"));
        let set = select_candidates(&catalog, &ctx, &ledger, &config).expect("river");
        assert!(!set.contains("OLD_WHISKERS"));
        assert!(set.contains("CHANNEL_CATFISH"));
    }

    #[test]
    fn test_draw_uses_cumulative_order() {
        let set = CandidateSet {
            entries: vec![
                Candidate {
                    draw: Draw::Species("A".to_string()),
                    weight: 1.0,
                },
                Candidate {
                    draw: Draw::Species("B".to_string()),
                    weight: 0.0,
                },
                Candidate {
                    draw: Draw::NoBite,
                    weight: 1.0,
                },
            ],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..1000 {
            assert_ne!(set.draw(&mut rng), Draw::Species("B".to_string()));
        }
    }
}
