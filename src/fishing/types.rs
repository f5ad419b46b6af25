//! Fishing encounter data structures.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::species::{ItemId, LocationId, SpeciesId, TimeOfDay, WaterType, Weather};
use crate::world::{AnglerId, AnglerSkill, RodStats};

pub type EncounterId = Uuid;

/// Immutable snapshot of everything that shapes one cast.
///
/// Built once by the context resolver. World changes after the cast (weather
/// shifting, the clock ticking over) never reach an in-flight encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterContext {
    pub angler: AnglerId,
    pub location: LocationId,
    pub water_types: BTreeSet<WaterType>,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
    pub bait: Option<ItemId>,
    pub lure: Option<ItemId>,
    pub rod: RodStats,
    pub skill: AnglerSkill,
}

/// Observable encounter phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Casting,
    Waiting,
    Biting,
    Hooking,
    Fighting,
    Landed,
    Escaped,
    BrokeOff,
    TimedOut,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::Landed | Phase::Escaped | Phase::BrokeOff | Phase::TimedOut
        )
    }
}

/// What the candidate selector drew for a cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Draw {
    Species(SpeciesId),
    NoBite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    ReeledIn,
    Disconnected,
    MovedAway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapeReason {
    /// No hook inside the bite window.
    MissedBite,
    /// The hook skill check failed.
    HookFailed,
    Cancelled(CancelReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutReason {
    NoBite,
    FightTimeout,
}

/// Player input during the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FightAction {
    Reel,
    GiveSlack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootDrop {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Reward for a landed fish. The engine hands this to the caller and never
/// applies it to inventory or currency itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchResult {
    pub species: SpeciesId,
    /// Kilograms.
    pub weight: f64,
    pub value: u32,
    pub experience: u32,
    pub loot: Vec<LootDrop>,
    pub is_new_record: bool,
    /// True when this catch claimed a one-per-location legendary.
    pub legendary_claimed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncounterOutcome {
    Landed(CatchResult),
    Escaped(EscapeReason),
    BrokeOff { species: SpeciesId },
    TimedOut(TimeoutReason),
}

impl EncounterOutcome {
    pub fn phase(&self) -> Phase {
        match self {
            EncounterOutcome::Landed(_) => Phase::Landed,
            EncounterOutcome::Escaped(_) => Phase::Escaped,
            EncounterOutcome::BrokeOff { .. } => Phase::BrokeOff,
            EncounterOutcome::TimedOut(_) => Phase::TimedOut,
        }
    }

    pub fn catch(&self) -> Option<&CatchResult> {
        match self {
            EncounterOutcome::Landed(result) => Some(result),
            _ => None,
        }
    }
}

/// Non-blocking status returned by `poll_outcome`.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    Pending(Phase),
    Resolved(EncounterOutcome),
}

impl PollStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, PollStatus::Resolved(_))
    }
}
