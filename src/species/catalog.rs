//! Read-only species catalog.
//!
//! The engine only talks to [`SpeciesCatalog`]; where the data comes from is
//! the host's business. [`InMemoryCatalog`] covers tests, the simulator and
//! hosts that ship the catalog as JSON.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use super::types::{FishSpecies, SpeciesId, WaterType};
use crate::core::constants::MAX_DIFFICULTY;

pub const BUILTIN_SPECIES_CATALOG: &str = include_str!("data/fish_species.json");

/// Lookup interface over immutable species data.
///
/// Implementations must return species in ascending id order so candidate
/// selection is reproducible for a given seed.
pub trait SpeciesCatalog: Send + Sync {
    fn species(&self, id: &str) -> Option<&FishSpecies>;

    fn all(&self) -> Vec<&FishSpecies>;

    fn at_location(&self, location: &str, water: &BTreeSet<WaterType>) -> Vec<&FishSpecies> {
        self.all()
            .into_iter()
            .filter(|species| species.lives_in(location, water))
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse species catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read species catalog from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("duplicate species id {id}")]
    Duplicate { id: SpeciesId },
    #[error("species {id}: {reason}")]
    Invalid { id: SpeciesId, reason: String },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    #[allow(dead_code)]
    version: u32,
    species: Vec<FishSpecies>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    species: BTreeMap<SpeciesId, FishSpecies>,
}

impl InMemoryCatalog {
    pub fn new(species: Vec<FishSpecies>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for entry in species {
            validate_species(&entry)?;
            if map.contains_key(&entry.id) {
                return Err(CatalogError::Duplicate { id: entry.id });
            }
            map.insert(entry.id.clone(), entry);
        }
        Ok(Self { species: map })
    }

    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_SPECIES_CATALOG).expect("builtin species catalog should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.species)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl SpeciesCatalog for InMemoryCatalog {
    fn species(&self, id: &str) -> Option<&FishSpecies> {
        self.species.get(id)
    }

    fn all(&self) -> Vec<&FishSpecies> {
        self.species.values().collect()
    }
}

fn validate_species(species: &FishSpecies) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::Invalid {
        id: species.id.clone(),
        reason: reason.to_string(),
    };

    if species.id.is_empty() {
        return Err(invalid("id must not be empty"));
    }
    if species.water_types.is_empty() {
        return Err(invalid("at least one water type is required"));
    }
    if species.locations.is_empty() {
        return Err(invalid("at least one location is required"));
    }

    let w = &species.weight;
    if !(w.min > 0.0 && w.min <= w.average && w.average <= w.max) {
        return Err(invalid("weight must satisfy 0 < min <= average <= max"));
    }
    if w.record < w.min {
        return Err(invalid("record weight must be at least the minimum weight"));
    }
    if !species.base_chance.is_finite() || species.base_chance < 0.0 {
        return Err(invalid("baseChance must be a non-negative number"));
    }
    if species.hook_difficulty > MAX_DIFFICULTY
        || species.fight_difficulty > MAX_DIFFICULTY
        || species.aggression > MAX_DIFFICULTY
    {
        return Err(invalid(
            "hookDifficulty, fightDifficulty and aggression must be within 0-100",
        ));
    }
    if species.stamina == 0 {
        return Err(invalid("stamina must be positive"));
    }
    for loot in &species.loot_table {
        if !(0.0..=1.0).contains(&loot.chance) {
            return Err(invalid(&format!(
                "loot {} chance must be within [0, 1]",
                loot.item_id
            )));
        }
        if loot.quantity.min > loot.quantity.max {
            return Err(invalid(&format!(
                "loot {} quantity min exceeds max",
                loot.item_id
            )));
        }
    }
    Ok(())
}
