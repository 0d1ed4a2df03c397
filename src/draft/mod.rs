//! The caller-owned working draft and the finalizer that seals it into an
//! immutable character sheet.

mod finalize;
mod state;

pub use finalize::*;
pub use state::*;
