//! Angler - Fishing Encounter Simulation Engine
//!
//! Decides which fish bites for a cast, runs the bite, hook and fight
//! minigame as an explicit state machine, and hands back a catch result.
//! Persistence of inventory, currency and XP is left to the host game.

pub mod core;
pub mod fishing;
pub mod save_manager;
pub mod simulator;
pub mod species;
pub mod world;
