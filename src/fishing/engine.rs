//! The fishing engine facade.
//!
//! Owns every live encounter, enforces one live encounter per angler and is
//! the only place encounters are created, advanced and retired. Resolved
//! outcomes stay in an archive until taken with [`FishingEngine::take_outcome`];
//! long-lived hosts must drain it.
//!
//! Each encounter's RNG is seeded from the engine seed, the angler and that
//! angler's cast count, so one angler's casts replay identically no matter
//! how other anglers' casts interleave with them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use uuid::Builder;

use super::context::resolve_context;
use super::encounter::{FishingEncounter, TransitionError};
use super::error::{ActionError, CastError, RewardError};
use super::ledger::{CatchRecordStore, LegendaryLedger};
use super::selection::select_candidates;
use super::types::{
    CancelReason, EncounterId, EncounterOutcome, FightAction, Phase, PollStatus,
};
use crate::core::config::{ConfigError, EngineConfig};
use crate::species::SpeciesCatalog;
use crate::world::{AnglerId, AnglerProfiles, WorldService};

impl From<TransitionError> for ActionError {
    fn from(err: TransitionError) -> Self {
        ActionError::WrongPhase {
            action: err.event,
            phase: err.phase,
        }
    }
}

pub struct FishingEngine {
    catalog: Arc<dyn SpeciesCatalog>,
    world: Arc<dyn WorldService>,
    profiles: Arc<dyn AnglerProfiles>,
    ledger: Arc<LegendaryLedger>,
    records: Arc<CatchRecordStore>,
    config: EngineConfig,
    seed: u64,
    cast_counts: HashMap<AnglerId, u64>,
    live: BTreeMap<EncounterId, FishingEncounter>,
    by_angler: HashMap<AnglerId, EncounterId>,
    resolved: HashMap<EncounterId, Result<EncounterOutcome, RewardError>>,
}

impl FishingEngine {
    pub fn new(
        catalog: Arc<dyn SpeciesCatalog>,
        world: Arc<dyn WorldService>,
        profiles: Arc<dyn AnglerProfiles>,
        seed: u64,
    ) -> Self {
        Self {
            catalog,
            world,
            profiles,
            ledger: Arc::new(LegendaryLedger::new()),
            records: Arc::new(CatchRecordStore::new()),
            config: EngineConfig::default(),
            seed,
            cast_counts: HashMap::new(),
            live: BTreeMap::new(),
            by_angler: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    /// Replace the tuning. Rejected configs leave no engine behind.
    pub fn with_config(mut self, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Share a world-scoped ledger with other engines.
    pub fn with_ledger(mut self, ledger: Arc<LegendaryLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_records(mut self, records: Arc<CatchRecordStore>) -> Self {
        self.records = records;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<LegendaryLedger> {
        &self.ledger
    }

    pub fn records(&self) -> &Arc<CatchRecordStore> {
        &self.records
    }

    /// Start a cast for an angler at a location.
    ///
    /// Errors create no encounter. On success the encounter is already in
    /// Waiting with its hidden draw attached.
    pub fn start_cast(&mut self, angler: &str, location: &str) -> Result<EncounterId, CastError> {
        if let Some(existing) = self.by_angler.get(angler) {
            return Err(CastError::AlreadyActive {
                angler: angler.to_string(),
                encounter: *existing,
            });
        }

        let ctx = resolve_context(self.world.as_ref(), self.profiles.as_ref(), angler, location)?;
        let candidates = select_candidates(
            self.catalog.as_ref(),
            &ctx,
            &self.ledger,
            &self.config.selection,
        )?;

        let cast_index = self.cast_counts.get(angler).copied().unwrap_or(0);
        let mut encounter_rng = encounter_rng(self.seed, angler, cast_index);
        let id = Builder::from_random_bytes(encounter_rng.gen()).into_uuid();
        let encounter = FishingEncounter::cast(
            id,
            ctx,
            &candidates,
            self.catalog.as_ref(),
            &self.config.timing,
            encounter_rng,
        );

        tracing::debug!(
            target: "angler::encounter",
            encounter = %id,
            angler,
            location,
            "encounter.cast"
        );

        self.cast_counts.insert(angler.to_string(), cast_index + 1);
        self.by_angler.insert(angler.to_string(), id);
        self.live.insert(id, encounter);
        Ok(id)
    }

    /// Attempt to set the hook. Valid only while Biting; returns the phase the
    /// skill check left the encounter in.
    pub fn hook_attempt(&mut self, id: EncounterId) -> Result<Phase, ActionError> {
        let encounter = live_mut(&mut self.live, &self.resolved, id, "hook")?;
        let phase = encounter.hook(&self.config)?;
        self.settle_if_terminal(id);
        Ok(phase)
    }

    /// Queue fight input; applied at the next tick boundary.
    pub fn fight_action(&mut self, id: EncounterId, action: FightAction) -> Result<(), ActionError> {
        let encounter = live_mut(&mut self.live, &self.resolved, id, "fight_action")?;
        encounter.queue_action(action)?;
        Ok(())
    }

    /// Cancel an encounter. Terminal encounters are left as they are.
    pub fn cancel(&mut self, id: EncounterId, reason: CancelReason) -> Result<(), ActionError> {
        if self.resolved.contains_key(&id) {
            return Ok(());
        }
        let encounter = self
            .live
            .get_mut(&id)
            .ok_or(ActionError::UnknownEncounter(id))?;
        encounter.cancel(reason);
        self.settle_if_terminal(id);
        Ok(())
    }

    pub fn poll_outcome(&self, id: EncounterId) -> Result<PollStatus, ActionError> {
        if let Some(encounter) = self.live.get(&id) {
            return Ok(PollStatus::Pending(encounter.phase()));
        }
        match self.resolved.get(&id) {
            Some(Ok(outcome)) => Ok(PollStatus::Resolved(outcome.clone())),
            Some(Err(err)) => Err(ActionError::Reward(err.clone())),
            None => Err(ActionError::UnknownEncounter(id)),
        }
    }

    /// Remove a resolved outcome from the archive.
    pub fn take_outcome(&mut self, id: EncounterId) -> Result<EncounterOutcome, ActionError> {
        if let Some(encounter) = self.live.get(&id) {
            return Err(ActionError::WrongPhase {
                action: "take_outcome",
                phase: encounter.phase(),
            });
        }
        match self.resolved.remove(&id) {
            Some(outcome) => Ok(outcome?),
            None => Err(ActionError::UnknownEncounter(id)),
        }
    }

    /// Elapse phase timers for every live encounter, in id order.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let ids: Vec<EncounterId> = self.live.keys().copied().collect();
        for id in ids {
            if let Some(encounter) = self.live.get_mut(&id) {
                encounter.advance(elapsed_ms, &self.config);
            }
            self.settle_if_terminal(id);
        }
    }

    pub fn active_encounter(&self, angler: &str) -> Option<EncounterId> {
        self.by_angler.get(angler).copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Resolved outcomes not yet taken.
    pub fn archived_count(&self) -> usize {
        self.resolved.len()
    }

    /// Read-only view of a live encounter.
    pub fn encounter(&self, id: EncounterId) -> Option<&FishingEncounter> {
        self.live.get(&id)
    }

    fn settle_if_terminal(&mut self, id: EncounterId) {
        let Some(encounter) = self.live.get_mut(&id) else {
            return;
        };
        let Some(outcome) = encounter.settle(&self.ledger, &self.records) else {
            return;
        };

        let angler = encounter.angler().to_string();
        match &outcome {
            Ok(outcome) => tracing::info!(
                target: "angler::encounter",
                encounter = %id,
                angler = %angler,
                outcome = ?outcome.phase(),
                species = outcome.catch().map(|c| c.species.as_str()),
                "encounter.resolved"
            ),
            Err(err) => tracing::warn!(
                target: "angler::encounter",
                encounter = %id,
                angler = %angler,
                error = %err,
                "encounter.reward_failed"
            ),
        }

        self.live.remove(&id);
        self.by_angler.remove(&angler);
        self.resolved.insert(id, outcome);
    }
}

/// Seed for one angler's n-th cast.
fn encounter_rng(seed: u64, angler: &str, cast_index: u64) -> ChaCha8Rng {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update((angler.len() as u64).to_le_bytes());
    hasher.update(angler.as_bytes());
    hasher.update(cast_index.to_le_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    ChaCha8Rng::from_seed(bytes)
}

/// Look up a live encounter, reporting the outcome phase for resolved ones.
fn live_mut<'a>(
    live: &'a mut BTreeMap<EncounterId, FishingEncounter>,
    resolved: &HashMap<EncounterId, Result<EncounterOutcome, RewardError>>,
    id: EncounterId,
    action: &'static str,
) -> Result<&'a mut FishingEncounter, ActionError> {
    if let Some(Ok(outcome)) = resolved.get(&id) {
        return Err(ActionError::WrongPhase {
            action,
            phase: outcome.phase(),
        });
    }
    live.get_mut(&id).ok_or(ActionError::UnknownEncounter(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::NoBiteWeight;
    use crate::species::InMemoryCatalog;
    use crate::world::{AnglerProfile, ProfileDirectory, StaticWorld};

    fn engine(seed: u64) -> FishingEngine {
        let profiles = ProfileDirectory::new();
        let mut profile = AnglerProfile::default();
        profile.skill.hook = 100;
        profile.skill.reel = 30;
        profiles.insert("ana", profile.clone());
        profiles.insert("bo", profile);
        let mut config = EngineConfig::default();
        config.selection.no_bite = NoBiteWeight::Fixed(0.0);
        config.skill.jitter = 0;
        FishingEngine::new(
            Arc::new(InMemoryCatalog::builtin()),
            Arc::new(StaticWorld::builtin()),
            Arc::new(profiles),
            seed,
        )
        .with_config(config)
        .expect("valid config")
    }

    #[test]
    fn test_one_live_encounter_per_angler() {
        let mut engine = engine(1);
        let id = engine.start_cast("ana", "MILL_POND").expect("first cast");
        let err = engine.start_cast("ana", "MILL_POND").expect_err("second cast");
        assert_eq!(
            err,
            CastError::AlreadyActive {
                angler: "ana".to_string(),
                encounter: id
            }
        );
        assert!(engine.start_cast("bo", "MILL_POND").is_ok());
        assert_eq!(engine.live_count(), 2);
    }

    #[test]
    fn test_cast_errors_create_nothing() {
        let mut engine = engine(1);
        assert!(matches!(
            engine.start_cast("ana", "DUSTY_ROAD"),
            Err(CastError::InvalidLocation(_))
        ));
        assert!(matches!(
            engine.start_cast("zed", "MILL_POND"),
            Err(CastError::UnknownAngler(_))
        ));
        assert_eq!(engine.live_count(), 0);
        assert!(engine.active_encounter("ana").is_none());
    }

    #[test]
    fn test_full_catch_cycle() {
        let mut engine = engine(42);
        let id = engine.start_cast("ana", "MILL_POND").expect("cast");
        assert_eq!(engine.poll_outcome(id), Ok(PollStatus::Pending(Phase::Waiting)));

        engine.advance(2_600);
        assert_eq!(engine.poll_outcome(id), Ok(PollStatus::Pending(Phase::Biting)));
        assert_eq!(engine.hook_attempt(id), Ok(Phase::Fighting));

        for _ in 0..200 {
            if engine.poll_outcome(id).map(|s| s.is_resolved()).unwrap_or(true) {
                break;
            }
            let tension = engine
                .encounter(id)
                .and_then(|e| e.fight_state())
                .map_or(0.0, |f| f.tension);
            let action = if tension < 70.0 {
                FightAction::Reel
            } else {
                FightAction::GiveSlack
            };
            engine.fight_action(id, action).expect("fighting");
            engine.advance(250);
        }

        let PollStatus::Resolved(outcome) = engine.poll_outcome(id).expect("known") else {
            panic!("fight should resolve");
        };
        assert_eq!(outcome.phase(), Phase::Landed);
        assert!(engine.active_encounter("ana").is_none());
        assert_eq!(engine.take_outcome(id), Ok(outcome));
        assert_eq!(engine.poll_outcome(id), Err(ActionError::UnknownEncounter(id)));
    }

    #[test]
    fn test_wrong_phase_actions_leave_state() {
        let mut engine = engine(3);
        let id = engine.start_cast("ana", "MILL_POND").expect("cast");
        assert_eq!(
            engine.fight_action(id, FightAction::Reel),
            Err(ActionError::WrongPhase {
                action: "fight_action",
                phase: Phase::Waiting
            })
        );
        assert!(matches!(
            engine.hook_attempt(id),
            Err(ActionError::WrongPhase { .. })
        ));
        assert_eq!(engine.poll_outcome(id), Ok(PollStatus::Pending(Phase::Waiting)));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut engine = engine(3);
        let id = engine.start_cast("ana", "MILL_POND").expect("cast");
        engine.cancel(id, CancelReason::ReeledIn).expect("cancel");
        engine.cancel(id, CancelReason::Disconnected).expect("no-op");
        assert_eq!(
            engine.poll_outcome(id),
            Ok(PollStatus::Resolved(EncounterOutcome::Escaped(
                crate::fishing::types::EscapeReason::Cancelled(CancelReason::ReeledIn)
            )))
        );
        // Angler is free to cast again
        assert!(engine.start_cast("ana", "MILL_POND").is_ok());
    }

    #[test]
    fn test_unknown_encounter() {
        let mut engine = engine(3);
        let id = uuid::Uuid::nil();
        assert_eq!(engine.hook_attempt(id), Err(ActionError::UnknownEncounter(id)));
        assert_eq!(
            engine.cancel(id, CancelReason::MovedAway),
            Err(ActionError::UnknownEncounter(id))
        );
    }

    #[test]
    fn test_take_outcome_rejects_live() {
        let mut engine = engine(3);
        let id = engine.start_cast("ana", "MILL_POND").expect("cast");
        assert!(matches!(
            engine.take_outcome(id),
            Err(ActionError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_ids_are_deterministic() {
        let mut a = engine(9);
        let mut b = engine(9);
        assert_eq!(
            a.start_cast("ana", "MILL_POND").expect("cast"),
            b.start_cast("ana", "MILL_POND").expect("cast")
        );
    }

    #[test]
    fn test_invalid_config_rejected_before_casting() {
        let mut config = EngineConfig::default();
        config.timing.no_bite_wait_min_ms = 30_000;
        config.timing.no_bite_wait_max_ms = 1_000;
        let result = FishingEngine::new(
            Arc::new(InMemoryCatalog::builtin()),
            Arc::new(StaticWorld::builtin()),
            Arc::new(ProfileDirectory::new()),
            1,
        )
        .with_config(config);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_taking_outcomes_empties_archive() {
        let mut engine = engine(5);
        for _ in 0..50 {
            let id = engine.start_cast("ana", "MILL_POND").expect("cast");
            engine.cancel(id, CancelReason::ReeledIn).expect("cancel");
            assert_eq!(engine.archived_count(), 1);
            assert!(engine.take_outcome(id).is_ok());
        }
        assert_eq!(engine.archived_count(), 0);
        assert_eq!(engine.live_count(), 0);
    }

    #[test]
    fn test_cast_order_between_anglers_is_irrelevant() {
        let mut a = engine(9);
        let mut b = engine(9);

        let ana_a = a.start_cast("ana", "MILL_POND").expect("cast");
        let bo_a = a.start_cast("bo", "MILL_POND").expect("cast");
        let bo_b = b.start_cast("bo", "MILL_POND").expect("cast");
        let ana_b = b.start_cast("ana", "MILL_POND").expect("cast");
        assert_eq!(ana_a, ana_b);
        assert_eq!(bo_a, bo_b);
        assert_ne!(ana_a, bo_a);

        a.advance(2_600);
        b.advance(2_600);
        for (engine, id) in [(&mut a, ana_a), (&mut b, ana_b)] {
            assert_eq!(engine.hook_attempt(id), Ok(Phase::Fighting));
            for _ in 0..200 {
                if engine.poll_outcome(id).map(|s| s.is_resolved()).unwrap_or(true) {
                    break;
                }
                engine.fight_action(id, FightAction::Reel).expect("fighting");
                engine.advance(250);
            }
        }
        let first = a.take_outcome(ana_a).expect("resolved");
        assert_eq!(Ok(first), b.take_outcome(ana_b));
    }
}
