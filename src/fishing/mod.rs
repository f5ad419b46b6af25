//! Fishing encounters: context, candidate selection, the state machine, the
//! fight contest, rewards and the engine facade.

pub mod context;
#[cfg(feature = "driver")]
pub mod driver;
pub mod encounter;
pub mod engine;
pub mod error;
pub mod fight;
pub mod ledger;
pub mod reward;
pub mod selection;
pub mod types;

#[cfg(feature = "driver")]
pub use driver::EngineDriver;
pub use encounter::{transition, EncounterEvent, EncounterState, FishingEncounter, TransitionError};
pub use engine::FishingEngine;
pub use error::{ActionError, CastError, RewardError};
pub use fight::{FightState, FightStatus};
pub use ledger::{CatchRecord, CatchRecordEntry, CatchRecordStore, LegendaryLedger};
pub use selection::CandidateSet;
pub use types::*;
