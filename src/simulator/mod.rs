//! Fishing balance simulator for Monte Carlo analysis.
//!
//! Plays thousands of scripted encounters to analyze:
//! - Land, break-off, escape and timeout rates per species
//! - Weight and value distributions
//! - How tuning changes in `EngineConfig` shift those numbers
//!
//! The simulator drives the real `FishingEngine`, so results match live play.

mod config;
mod report;
mod runner;

pub use config::{AnglerStrategy, SimConfig};
pub use report::{CastStats, SimReport, SpeciesStats};
pub use runner::{play_cast, run_simulation, run_simulation_in, SimError, SimWorld, SIM_ANGLER};
