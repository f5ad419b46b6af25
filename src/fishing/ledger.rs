//! World-scoped shared state: the legendary ledger and per-angler catch records.
//!
//! Both are shared between engines behind `Arc` and guard their contents with
//! an internal mutex, so every write is a single-writer transaction.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::species::{LocationId, SpeciesId};
use crate::world::AnglerId;

/// Claimed `(species, location)` pairs for one-per-location legendaries.
#[derive(Debug, Default)]
pub struct LegendaryLedger {
    claimed: Mutex<BTreeSet<(SpeciesId, LocationId)>>,
}

impl LegendaryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_claims(claims: impl IntoIterator<Item = (SpeciesId, LocationId)>) -> Self {
        Self {
            claimed: Mutex::new(claims.into_iter().collect()),
        }
    }

    pub fn is_claimed(&self, species: &str, location: &str) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(species.to_string(), location.to_string()))
    }

    /// Atomically claim a legendary. Returns false if it was already claimed.
    pub fn try_claim(&self, species: &str, location: &str) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((species.to_string(), location.to_string()))
    }

    /// Sorted snapshot of every claim.
    pub fn claims(&self) -> Vec<(SpeciesId, LocationId)> {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.claimed.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Personal bests for one angler and species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CatchRecord {
    pub best_weight: f64,
    pub best_value: u32,
    pub total_caught: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchRecordEntry {
    pub angler: AnglerId,
    pub species: SpeciesId,
    pub record: CatchRecord,
}

#[derive(Debug, Default)]
pub struct CatchRecordStore {
    records: Mutex<BTreeMap<(AnglerId, SpeciesId), CatchRecord>>,
}

impl CatchRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CatchRecordEntry>) -> Self {
        Self {
            records: Mutex::new(
                entries
                    .into_iter()
                    .map(|e| ((e.angler, e.species), e.record))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, angler: &str, species: &str) -> Option<CatchRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(angler.to_string(), species.to_string()))
            .copied()
    }

    /// Record a landed fish. Returns true when the weight beats the stored best
    /// (the first catch of a species always does).
    pub fn record_catch(&self, angler: &str, species: &str, weight: f64, value: u32) -> bool {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = records
            .entry((angler.to_string(), species.to_string()))
            .or_default();

        let is_new_record = entry.total_caught == 0 || weight > entry.best_weight;
        if is_new_record {
            entry.best_weight = weight;
        }
        entry.best_value = entry.best_value.max(value);
        entry.total_caught = entry.total_caught.saturating_add(1);
        is_new_record
    }

    /// Sorted snapshot of every record.
    pub fn entries(&self) -> Vec<CatchRecordEntry> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|((angler, species), record)| CatchRecordEntry {
                angler: angler.clone(),
                species: species.clone(),
                record: *record,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
