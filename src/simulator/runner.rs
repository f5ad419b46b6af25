//! Main simulation runner.
//!
//! Drives real [`FishingEngine`] instances with a scripted angler so the
//! numbers match live play. Every cast gets its own engine seeded from the run
//! seed, so casts are independent and reproducible.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use super::config::SimConfig;
use super::report::{CastStats, SimReport};
use crate::core::config::ConfigError;
use crate::fishing::{
    ActionError, CancelReason, CastError, CatchRecordStore, EncounterId, EncounterState,
    FightAction, FishingEngine, LegendaryLedger, Phase, PollStatus,
};
use crate::species::SpeciesCatalog;
use crate::world::{AnglerProfile, Loadout, ProfileDirectory, StaticWorld};

pub const SIM_ANGLER: &str = "simulator";

/// Simulated time after which a cast is abandoned.
const MAX_CAST_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Cast(#[from] CastError),
    #[error("invalid engine config: {0}")]
    Config(#[from] ConfigError),
}

/// World-scoped stores shared by every cast in a run. Legendary claims land
/// in `ledger` even when casts run against a fresh ledger each, so a saved
/// world never holds records for an unclaimed legendary.
pub struct SimWorld {
    pub ledger: Arc<LegendaryLedger>,
    pub records: Arc<CatchRecordStore>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self {
            ledger: Arc::new(LegendaryLedger::new()),
            records: Arc::new(CatchRecordStore::new()),
        }
    }
}

/// Run the full simulation and return a report.
pub fn run_simulation(
    config: &SimConfig,
    catalog: Arc<dyn SpeciesCatalog>,
) -> Result<SimReport, SimError> {
    run_simulation_in(config, catalog, &SimWorld::default())
}

/// Like [`run_simulation`], but against caller-owned ledger and records so
/// they can be saved afterwards.
pub fn run_simulation_in(
    config: &SimConfig,
    catalog: Arc<dyn SpeciesCatalog>,
    sim_world: &SimWorld,
) -> Result<SimReport, SimError> {
    config.engine.validate()?;

    let world = StaticWorld::builtin();
    world.set_default_weather(config.weather);
    world.set_clock(config.clock);
    let world = Arc::new(world);

    let profiles = ProfileDirectory::new();
    profiles.insert(
        SIM_ANGLER,
        AnglerProfile {
            loadout: Loadout {
                bait: config.bait.clone(),
                lure: config.lure.clone(),
                rod: config.rod,
            },
            skill: config.skill,
        },
    );
    let profiles = Arc::new(profiles);

    let mut seeder = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut casts = Vec::with_capacity(config.num_casts as usize);
    for cast_idx in 0..config.num_casts {
        let ledger = if config.persistent_ledger {
            Arc::clone(&sim_world.ledger)
        } else {
            Arc::new(LegendaryLedger::new())
        };
        let mut engine = FishingEngine::new(
            Arc::clone(&catalog),
            world.clone(),
            profiles.clone(),
            seeder.gen(),
        )
        .with_config(config.engine.clone())?
        .with_ledger(Arc::clone(&ledger))
        .with_records(Arc::clone(&sim_world.records));

        let stats = play_cast(&mut engine, config)?;
        if !config.persistent_ledger {
            for (species, location) in ledger.claims() {
                sim_world.ledger.try_claim(&species, &location);
            }
        }

        if config.verbosity >= 2 {
            println!(
                "Cast {}/{} - {:?} species={} {:.1}s",
                cast_idx + 1,
                config.num_casts,
                stats.phase,
                stats.species.as_deref().unwrap_or("-"),
                stats.duration_ms as f64 / 1000.0
            );
        }
        casts.push(stats);
    }

    tracing::info!(
        target: "angler::simulator",
        casts = casts.len(),
        location = %config.location,
        "simulation.completed"
    );
    Ok(SimReport::from_casts(casts))
}

/// Play one encounter to its outcome with the scripted strategy.
pub fn play_cast(engine: &mut FishingEngine, config: &SimConfig) -> Result<CastStats, CastError> {
    let id = engine.start_cast(SIM_ANGLER, &config.location)?;
    let step = config.step_ms.max(1);

    let mut elapsed_ms = 0;
    let mut species = None;
    let mut fight_ticks = 0;

    let outcome = loop {
        let status = match engine.poll_outcome(id) {
            Ok(status) => status,
            Err(ActionError::Reward(err)) => {
                tracing::warn!(target: "angler::simulator", error = %err, "simulation.reward_failed");
                break None;
            }
            Err(_) => break None,
        };

        match status {
            PollStatus::Resolved(outcome) => break Some(outcome),
            PollStatus::Pending(Phase::Biting) => {
                species = biting_species(engine, id).or(species);
                engine.advance(config.strategy.reaction_ms);
                elapsed_ms += config.strategy.reaction_ms;
                // The bite may have expired during the reaction delay
                let _ = engine.hook_attempt(id);
                continue;
            }
            PollStatus::Pending(Phase::Fighting) => {
                if let Some(fight) = engine.encounter(id).and_then(|e| e.fight_state()) {
                    fight_ticks = fight.ticks;
                    let action = if fight.tension < config.strategy.reel_below_tension {
                        FightAction::Reel
                    } else {
                        FightAction::GiveSlack
                    };
                    let _ = engine.fight_action(id, action);
                }
            }
            PollStatus::Pending(_) => {}
        }

        if elapsed_ms >= MAX_CAST_MS {
            let _ = engine.cancel(id, CancelReason::ReeledIn);
            continue;
        }
        engine.advance(step);
        elapsed_ms += step;
    };

    Ok(CastStats {
        phase: outcome.as_ref().map_or(Phase::Escaped, |o| o.phase()),
        species: species.or_else(|| outcome.as_ref().and_then(|o| o.catch().map(|c| c.species.clone()))),
        outcome,
        duration_ms: elapsed_ms,
        fight_ticks,
    })
}

fn biting_species(engine: &FishingEngine, id: EncounterId) -> Option<String> {
    match engine.encounter(id)?.state() {
        EncounterState::Biting { species } => Some(species.clone()),
        _ => None,
    }
}
