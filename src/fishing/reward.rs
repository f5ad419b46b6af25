//! Catch rewards: weight, value, experience, loot, then the shared ledger and
//! personal records.

use rand::Rng;
use rand_distr::{Distribution, Triangular};

use super::error::RewardError;
use super::ledger::{CatchRecordStore, LegendaryLedger};
use super::types::{CatchResult, EncounterContext, LootDrop};
use crate::species::{FishSpecies, WeightRange};

/// Draw a weight from Triangular(min, max, mode = average), clamped to
/// `[min, min(max, record)]`.
pub fn sample_weight(range: &WeightRange, rng: &mut impl Rng) -> Result<f64, String> {
    let ceiling = range.ceiling();
    if !(range.min > 0.0 && range.average > 0.0) {
        return Err("min and average must be positive".to_string());
    }
    if ceiling < range.min {
        return Err(format!("ceiling {ceiling} is below min {}", range.min));
    }
    let dist = Triangular::new(range.min, range.max, range.average).map_err(|e| e.to_string())?;
    Ok(dist.sample(rng).clamp(range.min, ceiling))
}

/// Value scales linearly with weight relative to the species average.
pub fn catch_value(base_value: u32, weight: f64, average: f64) -> u32 {
    let value = (f64::from(base_value) * weight / average).round();
    (value.min(f64::from(u32::MAX)) as u32).max(1)
}

/// Roll every loot entry independently.
pub fn roll_loot(species: &FishSpecies, rng: &mut impl Rng) -> Vec<LootDrop> {
    let mut drops = Vec::new();
    for entry in &species.loot_table {
        if rng.gen::<f64>() >= entry.chance {
            continue;
        }
        let quantity = rng.gen_range(entry.quantity.min..=entry.quantity.max);
        if quantity > 0 {
            drops.push(LootDrop {
                item_id: entry.item_id.clone(),
                quantity,
            });
        }
    }
    drops
}

/// Resolve the full reward for a landed fish.
///
/// The legendary claim happens only after everything that can fail has
/// succeeded. Losing a claim race still pays out, with `legendary_claimed`
/// left false.
pub fn resolve_reward(
    species: &FishSpecies,
    ctx: &EncounterContext,
    ledger: &LegendaryLedger,
    records: &CatchRecordStore,
    rng: &mut impl Rng,
) -> Result<CatchResult, RewardError> {
    let weight = sample_weight(&species.weight, rng).map_err(|reason| RewardError::InvalidWeight {
        species: species.id.clone(),
        reason,
    })?;
    let value = catch_value(species.base_value, weight, species.weight.average);
    let loot = roll_loot(species, rng);

    let mut legendary_claimed = false;
    if species.is_location_exclusive() {
        legendary_claimed = ledger.try_claim(&species.id, &ctx.location);
        if !legendary_claimed {
            tracing::warn!(
                target: "angler::reward",
                species = %species.id,
                location = %ctx.location,
                angler = %ctx.angler,
                "legendary.claim_conflict"
            );
        }
    }

    let is_new_record = records.record_catch(&ctx.angler, &species.id, weight, value);

    Ok(CatchResult {
        species: species.id.clone(),
        weight,
        value,
        experience: species.experience,
        loot,
        is_new_record,
        legendary_claimed,
    })
}
