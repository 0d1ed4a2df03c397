//! Investigator Core - rules engine for investigator creation
//!
//! Dice and point-budget formulas, age modifiers, skill computation, a staged
//! validation engine and the finalizer that seals a draft into a character
//! sheet. Python bindings are available behind the `python` feature.

pub mod characteristics;
pub mod config;
pub mod draft;
pub mod error;
pub mod formula;
pub mod occupation;
pub mod skills;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use crate::config::Rulebook;
pub use crate::draft::{finalize_character, CharacterSheet, Draft};
pub use crate::error::{Result, RulesError};
pub use crate::validation::{validate_step, ValidationIssue, ValidationReport};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;

// ============================================================================
// Cached Rulebook
// ============================================================================

/// Global rulebook, loaded once and shared read-only
static CACHED_RULEBOOK: OnceCell<RwLock<Arc<Rulebook>>> = OnceCell::new();

/// Install a rulebook, replacing any previous one
pub fn init_rulebook(rulebook: Rulebook) {
    let rulebook = Arc::new(rulebook);
    let cached = CACHED_RULEBOOK.get_or_init(|| RwLock::new(Arc::clone(&rulebook)));
    *cached.write() = rulebook;
    tracing::debug!("rulebook installed");
}

/// Load, validate and install a rulebook from JSON
pub fn init_rulebook_from_json(json: &str) -> Result<()> {
    init_rulebook(Rulebook::from_json(json)?);
    Ok(())
}

/// Install the rulebook shipped with the crate
pub fn init_builtin_rulebook() -> Result<()> {
    init_rulebook(Rulebook::builtin()?);
    Ok(())
}

pub fn is_rulebook_initialized() -> bool {
    CACHED_RULEBOOK.get().is_some()
}

/// The installed rulebook, if any
pub fn current_rulebook() -> Option<Arc<Rulebook>> {
    CACHED_RULEBOOK.get().map(|lock| Arc::clone(&*lock.read()))
}

/// Run `f` against the installed rulebook
pub fn with_rulebook<T>(f: impl FnOnce(&Rulebook) -> T) -> Option<T> {
    current_rulebook().map(|rulebook| f(&rulebook))
}
