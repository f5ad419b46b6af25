//! Fish species data model and the read-only catalog interface.

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;
