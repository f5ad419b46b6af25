//! Hook skill check and the per-tick stamina/tension race.

use rand::Rng;

use super::types::{EncounterContext, FightAction};
use crate::core::config::FightConfig;
use crate::core::constants::METER_MAX;
use crate::species::FishSpecies;

/// Succeeds iff `skill + bonus + jitter > difficulty`, jitter uniform in
/// `[-jitter, jitter]`.
pub fn skill_check(
    skill: i32,
    bonus: i32,
    difficulty: u32,
    jitter: i32,
    rng: &mut impl Rng,
) -> bool {
    let roll = if jitter > 0 {
        rng.gen_range(-jitter..=jitter)
    } else {
        0
    };
    let total = i64::from(skill) + i64::from(bonus) + i64::from(roll);
    total > i64::from(difficulty)
}

/// Per-fight constants derived once when the fish is hooked.
#[derive(Debug, Clone, PartialEq)]
pub struct FightParams {
    /// Species stamina in points; 100% of the meter.
    pub stamina_pool: f64,
    pub aggression: f64,
    /// Stamina points drained by one reel action.
    pub reel_power: f64,
    /// Multiplier applied to every tension increase.
    pub tension_scale: f64,
}

impl FightParams {
    pub fn new(species: &FishSpecies, ctx: &EncounterContext, config: &FightConfig) -> Self {
        let raw_reel = config.reel_base + f64::from(ctx.skill.reel) + f64::from(ctx.rod.reel_bonus);
        let reel_power =
            raw_reel.max(0.0) * 100.0 / (100.0 + f64::from(species.fight_difficulty));
        Self {
            stamina_pool: f64::from(species.stamina.max(1)),
            aggression: f64::from(species.aggression),
            reel_power,
            tension_scale: 100.0 / (100.0 + f64::from(ctx.rod.line_strength)),
        }
    }

    fn points_to_meter(&self, points: f64) -> f64 {
        points * METER_MAX / self.stamina_pool
    }
}

/// Fish stamina and line tension, both on a 0-100 meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FightState {
    pub stamina: f64,
    pub tension: f64,
    pub ticks: u32,
}

impl Default for FightState {
    fn default() -> Self {
        Self {
            stamina: METER_MAX,
            tension: 0.0,
            ticks: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightStatus {
    Ongoing,
    Landed,
    BrokeOff,
}

/// Run one fight tick.
///
/// Order: burst roll (always exactly one draw), burst tension or decay, the
/// angler's input, passive drain, clamp, then break before land.
pub fn fight_tick(
    state: &mut FightState,
    params: &FightParams,
    input: Option<FightAction>,
    config: &FightConfig,
    rng: &mut impl Rng,
) -> FightStatus {
    let burst_chance = (params.aggression / config.burst_chance_divisor).clamp(0.0, 1.0);
    let burst = rng.gen::<f64>() < burst_chance;

    let mut tension = state.tension;
    let mut stamina_points = 0.0;

    if burst {
        let surge = config.burst_tension_base + params.aggression * config.burst_aggression_scale;
        tension += surge * params.tension_scale;
    } else {
        tension -= config.tension_decay;
    }

    match input {
        Some(FightAction::Reel) => {
            stamina_points -= params.reel_power;
            tension += config.reel_strain * params.tension_scale;
        }
        Some(FightAction::GiveSlack) => {
            tension -= config.slack_relief;
            stamina_points += config.slack_recovery;
        }
        None => {}
    }

    stamina_points -= config.passive_drain;

    state.stamina = (state.stamina + params.points_to_meter(stamina_points)).clamp(0.0, METER_MAX);
    state.tension = tension.clamp(0.0, METER_MAX);
    state.ticks += 1;

    if state.tension >= config.break_threshold {
        FightStatus::BrokeOff
    } else if state.stamina <= 0.0 {
        FightStatus::Landed
    } else {
        FightStatus::Ongoing
    }
}
