//! Skill computation: name normalization, point allocations and the
//! per-skill breakdown shown on the sheet.

mod allocation;
mod breakdown;
mod normalize;

pub use allocation::*;
pub use breakdown::*;
pub use normalize::*;
