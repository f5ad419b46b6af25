//! The encounter state machine.
//!
//! [`transition`] is the whole legal state graph as one exhaustive match; it
//! never touches timers or randomness. [`FishingEncounter`] wraps it with
//! phase timers, a per-encounter RNG and the pending fight input.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use super::error::RewardError;
use super::fight::{fight_tick, skill_check, FightParams, FightState, FightStatus};
use super::ledger::{CatchRecordStore, LegendaryLedger};
use super::reward::resolve_reward;
use super::selection::CandidateSet;
use super::types::{
    CancelReason, Draw, EncounterContext, EncounterId, EncounterOutcome, EscapeReason,
    FightAction, Phase, TimeoutReason,
};
use crate::core::config::{EngineConfig, TimingConfig};
use crate::core::constants::MAX_DIFFICULTY;
use crate::species::{FishSpecies, SpeciesCatalog, SpeciesId};

#[derive(Debug, Clone, PartialEq)]
pub enum EncounterState {
    Idle,
    Casting,
    Waiting { draw: Draw },
    Biting { species: SpeciesId },
    Hooking { species: SpeciesId },
    Fighting { species: SpeciesId },
    Landed { species: SpeciesId },
    Escaped(EscapeReason),
    BrokeOff { species: SpeciesId },
    TimedOut(TimeoutReason),
}

impl EncounterState {
    pub fn phase(&self) -> Phase {
        match self {
            EncounterState::Idle => Phase::Idle,
            EncounterState::Casting => Phase::Casting,
            EncounterState::Waiting { .. } => Phase::Waiting,
            EncounterState::Biting { .. } => Phase::Biting,
            EncounterState::Hooking { .. } => Phase::Hooking,
            EncounterState::Fighting { .. } => Phase::Fighting,
            EncounterState::Landed { .. } => Phase::Landed,
            EncounterState::Escaped(_) => Phase::Escaped,
            EncounterState::BrokeOff { .. } => Phase::BrokeOff,
            EncounterState::TimedOut(_) => Phase::TimedOut,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EncounterEvent {
    Cast,
    Drawn(Draw),
    WaitElapsed,
    Hook,
    BiteExpired,
    HookChecked { success: bool },
    FightTick(FightStatus),
    FightExpired,
    Cancel(CancelReason),
}

impl EncounterEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EncounterEvent::Cast => "cast",
            EncounterEvent::Drawn(_) => "draw",
            EncounterEvent::WaitElapsed => "wait_elapsed",
            EncounterEvent::Hook => "hook",
            EncounterEvent::BiteExpired => "bite_expired",
            EncounterEvent::HookChecked { .. } => "hook_check",
            EncounterEvent::FightTick(_) => "fight_tick",
            EncounterEvent::FightExpired => "fight_expired",
            EncounterEvent::Cancel(_) => "cancel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{event} is not valid while {phase:?}")]
pub struct TransitionError {
    pub phase: Phase,
    pub event: &'static str,
}

/// Pure transition function. Invalid pairs return an error and the caller
/// keeps its current state.
pub fn transition(
    state: &EncounterState,
    event: EncounterEvent,
) -> Result<EncounterState, TransitionError> {
    use EncounterEvent as E;
    use EncounterState as S;

    let next = match (state, event) {
        // Cancelling a finished encounter is a no-op
        (s, E::Cancel(_)) if s.is_terminal() => s.clone(),
        (_, E::Cancel(reason)) => S::Escaped(EscapeReason::Cancelled(reason)),

        (S::Idle, E::Cast) => S::Casting,
        (S::Casting, E::Drawn(draw)) => S::Waiting { draw },

        (S::Waiting { draw: Draw::NoBite }, E::WaitElapsed) => S::TimedOut(TimeoutReason::NoBite),
        (S::Waiting { draw: Draw::Species(species) }, E::WaitElapsed) => S::Biting {
            species: species.clone(),
        },

        (S::Biting { species }, E::Hook) => S::Hooking {
            species: species.clone(),
        },
        (S::Biting { .. }, E::BiteExpired) => S::Escaped(EscapeReason::MissedBite),

        (S::Hooking { species }, E::HookChecked { success: true }) => S::Fighting {
            species: species.clone(),
        },
        (S::Hooking { .. }, E::HookChecked { success: false }) => {
            S::Escaped(EscapeReason::HookFailed)
        }

        (S::Fighting { species }, E::FightTick(status)) => match status {
            FightStatus::Ongoing => S::Fighting {
                species: species.clone(),
            },
            FightStatus::Landed => S::Landed {
                species: species.clone(),
            },
            FightStatus::BrokeOff => S::BrokeOff {
                species: species.clone(),
            },
        },
        (S::Fighting { .. }, E::FightExpired) => S::TimedOut(TimeoutReason::FightTimeout),

        (s, e) => {
            return Err(TransitionError {
                phase: s.phase(),
                event: e.name(),
            })
        }
    };
    Ok(next)
}

/// Timer state attached to the phases that wait on elapsed time.
#[derive(Debug, Clone)]
enum PhaseTimer {
    None,
    /// Waiting or Biting: milliseconds until the phase expires.
    Countdown(u64),
    Fight(FightClock),
}

#[derive(Debug, Clone)]
struct FightClock {
    state: FightState,
    params: FightParams,
    /// Elapsed time not yet consumed by a whole tick.
    carry_ms: u64,
    max_ticks: u32,
}

/// One cast, from draw to terminal outcome. Owned by exactly one engine.
#[derive(Debug, Clone)]
pub struct FishingEncounter {
    id: EncounterId,
    context: EncounterContext,
    state: EncounterState,
    /// Hidden until the bite; cloned so later catalog changes can't reach it.
    species: Option<FishSpecies>,
    timer: PhaseTimer,
    pending: Option<FightAction>,
    rng: ChaCha8Rng,
}

impl FishingEncounter {
    /// Cast a line: Idle → Casting → Waiting, with the draw taken from this
    /// encounter's own RNG.
    pub fn cast(
        id: EncounterId,
        context: EncounterContext,
        candidates: &CandidateSet,
        catalog: &dyn SpeciesCatalog,
        timing: &TimingConfig,
        mut rng: ChaCha8Rng,
    ) -> Self {
        let draw = candidates.draw(&mut rng);
        let species = match &draw {
            Draw::Species(id) => catalog.species(id).cloned(),
            Draw::NoBite => None,
        };
        // A drawn id missing from the catalog behaves like no bite
        let draw = if species.is_some() { draw } else { Draw::NoBite };

        let wait_ms = match &species {
            Some(species) => {
                let factor = rng.gen_range(
                    (1.0 - timing.bite_speed_jitter)..=(1.0 + timing.bite_speed_jitter),
                );
                (species.bite_speed as f64 * factor).round() as u64
            }
            None => rng.gen_range(timing.no_bite_wait_min_ms..=timing.no_bite_wait_max_ms),
        };

        let mut encounter = Self {
            id,
            context,
            state: EncounterState::Idle,
            species,
            timer: PhaseTimer::None,
            pending: None,
            rng,
        };
        encounter.apply(EncounterEvent::Cast);
        encounter.apply(EncounterEvent::Drawn(draw));
        encounter.timer = PhaseTimer::Countdown(wait_ms);
        encounter
    }

    pub fn id(&self) -> EncounterId {
        self.id
    }

    pub fn angler(&self) -> &str {
        &self.context.angler
    }

    pub fn context(&self) -> &EncounterContext {
        &self.context
    }

    pub fn state(&self) -> &EncounterState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Fight meters, while fighting.
    pub fn fight_state(&self) -> Option<FightState> {
        match &self.timer {
            PhaseTimer::Fight(clock) => Some(clock.state),
            _ => None,
        }
    }

    fn apply(&mut self, event: EncounterEvent) {
        if let Ok(next) = transition(&self.state, event) {
            self.apply_state(next);
        }
    }

    fn try_apply(&mut self, event: EncounterEvent) -> Result<(), TransitionError> {
        let next = transition(&self.state, event)?;
        self.apply_state(next);
        Ok(())
    }

    fn apply_state(&mut self, next: EncounterState) {
        if next != self.state {
            tracing::debug!(
                target: "angler::encounter",
                encounter = %self.id,
                from = ?self.state.phase(),
                to = ?next.phase(),
                "encounter.transition"
            );
            self.state = next;
        }
        if self.state.is_terminal() {
            self.timer = PhaseTimer::None;
            self.pending = None;
        }
    }

    /// Set the hook. Runs the skill check immediately and returns the
    /// resulting phase (Fighting or Escaped).
    pub fn hook(&mut self, config: &EngineConfig) -> Result<Phase, TransitionError> {
        self.try_apply(EncounterEvent::Hook)?;

        let Some(species) = self.species.clone() else {
            // Biting always carries a species
            self.try_apply(EncounterEvent::HookChecked { success: false })?;
            return Ok(self.phase());
        };

        let success = skill_check(
            self.context.skill.hook,
            self.context.rod.hook_bonus,
            species.hook_difficulty,
            config.skill.jitter,
            &mut self.rng,
        );
        self.try_apply(EncounterEvent::HookChecked { success })?;

        if success {
            let tick_ms = config.timing.fight_tick_ms.max(1);
            let budget_ms = species
                .base_fight_time
                .saturating_mul(config.timing.fight_timeout_multiplier);
            let max_ticks = budget_ms.div_ceil(tick_ms).clamp(1, u64::from(u32::MAX)) as u32;
            self.timer = PhaseTimer::Fight(FightClock {
                state: FightState::default(),
                params: FightParams::new(&species, &self.context, &config.fight),
                carry_ms: 0,
                max_ticks,
            });
        }
        Ok(self.phase())
    }

    /// Queue fight input for the next tick; a later action replaces an
    /// earlier one that has not been applied yet.
    pub fn queue_action(&mut self, action: FightAction) -> Result<(), TransitionError> {
        if self.phase() != Phase::Fighting {
            return Err(TransitionError {
                phase: self.phase(),
                event: "fight_action",
            });
        }
        self.pending = Some(action);
        Ok(())
    }

    pub fn cancel(&mut self, reason: CancelReason) {
        if let Ok(next) = transition(&self.state, EncounterEvent::Cancel(reason)) {
            self.apply_state(next);
        }
    }

    /// Elapse phase timers. Time left over after a phase ends carries into
    /// the next timed phase.
    pub fn advance(&mut self, elapsed_ms: u64, config: &EngineConfig) {
        let mut remaining = elapsed_ms;
        loop {
            match (&self.state, &mut self.timer) {
                (EncounterState::Waiting { .. }, PhaseTimer::Countdown(left)) => {
                    if remaining < *left {
                        *left -= remaining;
                        return;
                    }
                    remaining -= *left;
                    self.timer = PhaseTimer::None;
                    self.apply(EncounterEvent::WaitElapsed);
                    if self.phase() == Phase::Biting {
                        self.timer = PhaseTimer::Countdown(self.bite_window_ms(&config.timing));
                    }
                }
                (EncounterState::Biting { .. }, PhaseTimer::Countdown(left)) => {
                    if remaining < *left {
                        *left -= remaining;
                        return;
                    }
                    self.apply(EncounterEvent::BiteExpired);
                    return;
                }
                (EncounterState::Fighting { .. }, PhaseTimer::Fight(_)) => {
                    self.advance_fight(remaining, config);
                    return;
                }
                _ => return,
            }
        }
    }

    fn bite_window_ms(&self, timing: &TimingConfig) -> u64 {
        let difficulty = self
            .species
            .as_ref()
            .map_or(0, |s| s.hook_difficulty.min(MAX_DIFFICULTY));
        let scaled = timing.bite_window_ms as f64 * (1.0 - f64::from(difficulty) / 100.0);
        (scaled.round() as u64).max(timing.bite_window_floor_ms)
    }

    fn advance_fight(&mut self, elapsed_ms: u64, config: &EngineConfig) {
        let tick_ms = config.timing.fight_tick_ms.max(1);
        let PhaseTimer::Fight(clock) = &mut self.timer else {
            return;
        };
        clock.carry_ms += elapsed_ms;

        while clock.carry_ms >= tick_ms {
            clock.carry_ms -= tick_ms;
            let input = self.pending.take();
            let status = fight_tick(
                &mut clock.state,
                &clock.params,
                input,
                &config.fight,
                &mut self.rng,
            );

            let event = if status == FightStatus::Ongoing && clock.state.ticks >= clock.max_ticks {
                EncounterEvent::FightExpired
            } else {
                EncounterEvent::FightTick(status)
            };
            let Ok(next) = transition(&self.state, event) else {
                return;
            };
            if next.is_terminal() {
                self.apply_state(next);
                return;
            }
        }
    }

    /// Map a terminal state to its outcome, resolving the reward for a land.
    /// Returns `None` while the encounter is still live.
    pub fn settle(
        &mut self,
        ledger: &LegendaryLedger,
        records: &CatchRecordStore,
    ) -> Option<Result<EncounterOutcome, RewardError>> {
        let outcome = match &self.state {
            EncounterState::Landed { species } => {
                let reward = match &self.species {
                    Some(drawn) => {
                        resolve_reward(drawn, &self.context, ledger, records, &mut self.rng)
                    }
                    None => Err(RewardError::MissingSpecies(species.clone())),
                };
                reward.map(EncounterOutcome::Landed)
            }
            EncounterState::Escaped(reason) => Ok(EncounterOutcome::Escaped(*reason)),
            EncounterState::BrokeOff { species } => Ok(EncounterOutcome::BrokeOff {
                species: species.clone(),
            }),
            EncounterState::TimedOut(reason) => Ok(EncounterOutcome::TimedOut(*reason)),
            _ => return None,
        };
        Some(outcome)
    }
}
