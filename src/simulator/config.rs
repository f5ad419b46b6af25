//! Simulation configuration.

use chrono::NaiveTime;

use crate::core::config::EngineConfig;
use crate::species::Weather;
use crate::world::{AnglerSkill, RodStats};

/// How the scripted angler plays each encounter.
#[derive(Debug, Clone, PartialEq)]
pub struct AnglerStrategy {
    /// Delay between the bite and the hook attempt. Longer than the bite
    /// window means the fish always escapes.
    pub reaction_ms: u64,
    /// Reel while tension is below this, give slack at or above it.
    pub reel_below_tension: f64,
}

impl Default for AnglerStrategy {
    fn default() -> Self {
        Self {
            reaction_ms: 300,
            reel_below_tension: 70.0,
        }
    }
}

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of casts to play
    pub num_casts: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    pub location: String,
    pub clock: NaiveTime,
    pub weather: Weather,
    pub bait: Option<String>,
    pub lure: Option<String>,
    pub skill: AnglerSkill,
    pub rod: RodStats,
    pub strategy: AnglerStrategy,

    /// Engine tuning under test
    pub engine: EngineConfig,

    /// Granularity of simulated time, in milliseconds
    pub step_ms: u64,

    /// Keep legendary claims between casts. Off means every cast sees a
    /// fresh ledger, which is what rate measurements want.
    pub persistent_ledger: bool,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per cast)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_casts: 1000,
            seed: None,
            location: "MILL_POND".to_string(),
            clock: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            weather: Weather::Clear,
            bait: None,
            lure: None,
            skill: AnglerSkill { hook: 20, reel: 5 },
            rod: RodStats::default(),
            strategy: AnglerStrategy::default(),
            engine: EngineConfig::default(),
            step_ms: 50,
            persistent_ledger: false,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Quick config for a novice at the mill pond
    pub fn pond_baseline() -> Self {
        Self {
            num_casts: 500,
            bait: Some("WORMS".to_string()),
            ..Default::default()
        }
    }

    /// Quick config for hunting The Ghost with a strong angler
    pub fn legendary_hunt() -> Self {
        Self {
            num_casts: 2000,
            location: "MISTY_LAKE".to_string(),
            clock: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or_default(),
            weather: Weather::Fog,
            bait: Some("SPIRIT_WORM".to_string()),
            skill: AnglerSkill { hook: 90, reel: 40 },
            rod: RodStats {
                hook_bonus: 5,
                reel_bonus: 10,
                line_strength: 50,
                ..RodStats::default()
            },
            ..Default::default()
        }
    }

    /// Quick config for surveying one location at a given hour
    pub fn location_survey(location: &str, hour: u32) -> Self {
        Self {
            location: location.to_string(),
            clock: NaiveTime::from_hms_opt(hour % 24, 0, 0).unwrap_or_default(),
            ..Default::default()
        }
    }
}
