//! Engine-wide constants and tuning configuration.

pub mod config;
pub mod constants;

pub use config::*;
pub use constants::*;
