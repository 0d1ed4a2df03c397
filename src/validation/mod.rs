//! Validation engine
//!
//! A draft is checked stage by stage; stage N re-runs every check of the
//! stages before it. Issues are data: warnings never block, a single error
//! keeps the wizard from advancing and the finalizer from sealing the sheet.

mod checks;
mod issue;
mod stage;


pub use checks::*;
pub use issue::*;
pub use stage::*;
