//! Simulation report generation.

use std::collections::BTreeMap;

use crate::fishing::{EncounterOutcome, EscapeReason, Phase, TimeoutReason};
use crate::species::{ItemId, SpeciesId};

/// What happened on one simulated cast.
#[derive(Debug, Clone)]
pub struct CastStats {
    /// None when the outcome could not be resolved (reward failure).
    pub outcome: Option<EncounterOutcome>,
    pub phase: Phase,
    /// Species that bit, if any.
    pub species: Option<SpeciesId>,
    pub duration_ms: u64,
    pub fight_ticks: u32,
}

/// Per-species tallies, counted from the bite onwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesStats {
    pub bites: u32,
    pub landed: u32,
    pub escaped: u32,
    pub broke_off: u32,
    pub timed_out: u32,
    pub total_weight: f64,
    pub total_value: u64,
    pub max_weight: f64,
}

impl SpeciesStats {
    pub fn land_rate(&self) -> f64 {
        if self.bites == 0 {
            0.0
        } else {
            self.landed as f64 / self.bites as f64
        }
    }

    pub fn avg_weight(&self) -> f64 {
        self.total_weight / self.landed.max(1) as f64
    }
}

/// Aggregated results from a simulation run.
#[derive(Debug, Clone)]
pub struct SimReport {
    pub num_casts: u32,
    pub landed: u32,
    pub broke_off: u32,
    pub escaped_missed_bite: u32,
    pub escaped_hook_failed: u32,
    pub cancelled: u32,
    pub timed_out_no_bite: u32,
    pub timed_out_fight: u32,
    pub unresolved: u32,

    pub avg_cast_ms: f64,
    pub total_experience: u64,
    pub total_value: u64,
    pub new_records: u32,
    pub legendary_claims: u32,

    pub species: BTreeMap<SpeciesId, SpeciesStats>,
    pub loot: BTreeMap<ItemId, u64>,

    // Individual cast stats for detailed analysis
    pub casts: Vec<CastStats>,
}

impl SimReport {
    pub fn from_casts(casts: Vec<CastStats>) -> Self {
        let mut report = Self {
            num_casts: casts.len() as u32,
            landed: 0,
            broke_off: 0,
            escaped_missed_bite: 0,
            escaped_hook_failed: 0,
            cancelled: 0,
            timed_out_no_bite: 0,
            timed_out_fight: 0,
            unresolved: 0,
            avg_cast_ms: casts.iter().map(|c| c.duration_ms as f64).sum::<f64>()
                / casts.len().max(1) as f64,
            total_experience: 0,
            total_value: 0,
            new_records: 0,
            legendary_claims: 0,
            species: BTreeMap::new(),
            loot: BTreeMap::new(),
            casts: Vec::new(),
        };

        for cast in &casts {
            let species = cast
                .species
                .as_ref()
                .map(|id| report.species.entry(id.clone()).or_default());
            let Some(outcome) = &cast.outcome else {
                report.unresolved += 1;
                continue;
            };

            match outcome {
                EncounterOutcome::Landed(catch) => {
                    report.landed += 1;
                    report.total_experience += u64::from(catch.experience);
                    report.total_value += u64::from(catch.value);
                    report.new_records += u32::from(catch.is_new_record);
                    report.legendary_claims += u32::from(catch.legendary_claimed);
                    for drop in &catch.loot {
                        *report.loot.entry(drop.item_id.clone()).or_insert(0) +=
                            u64::from(drop.quantity);
                    }
                    if let Some(s) = species {
                        s.bites += 1;
                        s.landed += 1;
                        s.total_weight += catch.weight;
                        s.total_value += u64::from(catch.value);
                        s.max_weight = s.max_weight.max(catch.weight);
                    }
                }
                EncounterOutcome::BrokeOff { .. } => {
                    report.broke_off += 1;
                    if let Some(s) = species {
                        s.bites += 1;
                        s.broke_off += 1;
                    }
                }
                EncounterOutcome::Escaped(reason) => {
                    match reason {
                        EscapeReason::MissedBite => report.escaped_missed_bite += 1,
                        EscapeReason::HookFailed => report.escaped_hook_failed += 1,
                        EscapeReason::Cancelled(_) => report.cancelled += 1,
                    }
                    if let Some(s) = species {
                        s.bites += 1;
                        s.escaped += 1;
                    }
                }
                EncounterOutcome::TimedOut(reason) => {
                    match reason {
                        TimeoutReason::NoBite => report.timed_out_no_bite += 1,
                        TimeoutReason::FightTimeout => report.timed_out_fight += 1,
                    }
                    if let Some(s) = species {
                        s.bites += 1;
                        s.timed_out += 1;
                    }
                }
            }
        }

        report.casts = casts;
        report
    }

    fn pct(&self, count: u32) -> f64 {
        count as f64 / self.num_casts.max(1) as f64 * 100.0
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                  FISHING SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Casts: {}  |  Avg cast: {:.1}s\n\n",
            self.num_casts,
            self.avg_cast_ms / 1000.0
        ));

        report.push_str("── OUTCOMES ─────────────────────────────────────────────────────\n");
        let rows = [
            ("Landed", self.landed),
            ("Broke off", self.broke_off),
            ("Missed bite", self.escaped_missed_bite),
            ("Hook failed", self.escaped_hook_failed),
            ("Cancelled", self.cancelled),
            ("No bite", self.timed_out_no_bite),
            ("Fight timeout", self.timed_out_fight),
        ];
        for (label, count) in rows {
            let pct = self.pct(count);
            let bar: String = "█".repeat((pct / 5.0) as usize);
            report.push_str(&format!("  {label:<14} {count:>6} {pct:>5.1}% {bar}\n"));
        }
        if self.unresolved > 0 {
            report.push_str(&format!("  {:<14} {:>6}\n", "Unresolved", self.unresolved));
        }
        report.push('\n');

        report.push_str("── SPECIES ──────────────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  {:<18} {:>6} {:>7} {:>8} {:>9}\n",
            "Species", "Bites", "Land%", "Avg kg", "Max kg"
        ));
        for (id, s) in &self.species {
            report.push_str(&format!(
                "  {:<18} {:>6} {:>6.1}% {:>8.2} {:>9.2}\n",
                id,
                s.bites,
                s.land_rate() * 100.0,
                s.avg_weight(),
                s.max_weight
            ));
        }
        report.push('\n');

        report.push_str("── REWARDS ──────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Total XP:          {}\n", self.total_experience));
        report.push_str(&format!("  Total value:       {}\n", self.total_value));
        report.push_str(&format!("  New records:       {}\n", self.new_records));
        report.push_str(&format!("  Legendary claims:  {}\n", self.legendary_claims));
        for (item, quantity) in &self.loot {
            report.push_str(&format!("  {item:<18} x{quantity}\n"));
        }

        report
    }

    /// One-line summary for quiet mode.
    pub fn summary_line(&self) -> String {
        format!(
            "casts={} landed={} broke_off={} missed={} hook_failed={} no_bite={} fight_timeout={}",
            self.num_casts,
            self.landed,
            self.broke_off,
            self.escaped_missed_bite,
            self.escaped_hook_failed,
            self.timed_out_no_bite,
            self.timed_out_fight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fishing::{CatchResult, LootDrop};

    fn landed(species: &str, weight: f64) -> CastStats {
        CastStats {
            outcome: Some(EncounterOutcome::Landed(CatchResult {
                species: species.to_string(),
                weight,
                value: 10,
                experience: 5,
                loot: vec![LootDrop {
                    item_id: "FISH_SCALE".to_string(),
                    quantity: 2,
                }],
                is_new_record: false,
                legendary_claimed: false,
            })),
            phase: Phase::Landed,
            species: Some(species.to_string()),
            duration_ms: 4_000,
            fight_ticks: 3,
        }
    }

    #[test]
    fn test_tallies_by_outcome_and_species() {
        let casts = vec![
            landed("BLUEGILL", 0.4),
            landed("BLUEGILL", 0.6),
            CastStats {
                outcome: Some(EncounterOutcome::Escaped(EscapeReason::MissedBite)),
                phase: Phase::Escaped,
                species: Some("BLUEGILL".to_string()),
                duration_ms: 2_000,
                fight_ticks: 0,
            },
            CastStats {
                outcome: Some(EncounterOutcome::TimedOut(TimeoutReason::NoBite)),
                phase: Phase::TimedOut,
                species: None,
                duration_ms: 10_000,
                fight_ticks: 0,
            },
        ];
        let report = SimReport::from_casts(casts);
        assert_eq!(report.num_casts, 4);
        assert_eq!(report.landed, 2);
        assert_eq!(report.escaped_missed_bite, 1);
        assert_eq!(report.timed_out_no_bite, 1);
        assert_eq!(report.total_experience, 10);
        assert_eq!(report.loot.get("FISH_SCALE"), Some(&4));

        let bluegill = report.species.get("BLUEGILL").expect("bluegill tallied");
        assert_eq!(bluegill.bites, 3);
        assert_eq!(bluegill.landed, 2);
        assert!((bluegill.avg_weight() - 0.5).abs() < 1e-9);
        assert_eq!(bluegill.max_weight, 0.6);
        assert_eq!(report.avg_cast_ms, 5_000.0);
    }

    #[test]
    fn test_text_report_mentions_species() {
        let report = SimReport::from_casts(vec![landed("BLUEGILL", 0.4)]);
        let text = report.to_text();
        assert!(text.contains("FISHING SIMULATION REPORT"));
        assert!(text.contains("BLUEGILL"));
        assert!(report.summary_line().starts_with("casts=1 landed=1"));
    }

    #[test]
    fn test_empty_report() {
        let report = SimReport::from_casts(vec![]);
        assert_eq!(report.num_casts, 0);
        assert_eq!(report.avg_cast_ms, 0.0);
        assert!(report.to_text().contains("Casts: 0"));
    }
}
