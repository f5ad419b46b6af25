//! Typed failures returned by the engine. None of them are fatal to the host.

use thiserror::Error;

use super::types::{EncounterId, Phase};
use crate::species::{LocationId, SpeciesId};
use crate::world::AnglerId;

/// Why `start_cast` refused to create an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("angler {angler} already has encounter {encounter} in progress")]
    AlreadyActive {
        angler: AnglerId,
        encounter: EncounterId,
    },
    #[error("unknown angler {0}")]
    UnknownAngler(AnglerId),
    #[error("invalid location {0}: unknown or has no water")]
    InvalidLocation(LocationId),
    #[error("no species live in the water at {0}")]
    NoViableWater(LocationId),
}

/// Rejected player action or query. Encounter state is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("no encounter with id {0}")]
    UnknownEncounter(EncounterId),
    #[error("{action} is not valid while {phase:?}")]
    WrongPhase { action: &'static str, phase: Phase },
    #[error(transparent)]
    Reward(#[from] RewardError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RewardError {
    #[error("species {species}: invalid weight distribution ({reason})")]
    InvalidWeight { species: SpeciesId, reason: String },
    #[error("species {0} is not in the catalog")]
    MissingSpecies(SpeciesId),
}
