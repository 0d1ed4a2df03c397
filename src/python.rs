//! Python bindings
//!
//! Drafts, allocations and results cross the boundary as JSON strings, so the
//! Python side only ever deals with plain dicts.

use crate::characteristics::{self, AgePenaltyAllocation, Characteristic, Characteristics};
use crate::config::Rulebook;
use crate::draft::{self, Draft};
use crate::error::RulesError;
use crate::formula::{self, FormulaChoices};
use crate::occupation;
use crate::skills;
use crate::validation::{self, clamp_stage};
use pyo3::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

fn rulebook() -> PyResult<Arc<Rulebook>> {
    crate::current_rulebook().ok_or_else(|| {
        PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(
            "Rulebook not initialized. Call init_rulebook() first.",
        )
    })
}

fn parse<T: DeserializeOwned>(json: &str) -> PyResult<T> {
    Ok(serde_json::from_str(json).map_err(RulesError::from)?)
}

fn parse_or_default<T: DeserializeOwned + Default>(json: Option<&str>) -> PyResult<T> {
    json.map(parse).transpose().map(Option::unwrap_or_default)
}

fn dump<T: Serialize>(value: &T) -> PyResult<String> {
    Ok(serde_json::to_string(value).map_err(RulesError::from)?)
}

// ============================================================================
// Python Functions
// ============================================================================

/// Load the rulebook (call once at startup). Without JSON the built-in
/// rulebook is used.
#[pyfunction]
#[pyo3(signature = (json=None))]
fn init_rulebook(json: Option<&str>) -> PyResult<()> {
    match json {
        Some(json) => crate::init_rulebook_from_json(json)?,
        None => crate::init_builtin_rulebook()?,
    }
    Ok(())
}

#[pyfunction]
fn is_rulebook_initialized() -> bool {
    crate::is_rulebook_initialized()
}

/// Roll all nine characteristics and apply age modifiers.
/// Returns the aged block with its audit trail as JSON.
#[pyfunction]
#[pyo3(signature = (age, allocation=None))]
fn roll_characteristics(age: u32, allocation: Option<&str>) -> PyResult<String> {
    let rulebook = rulebook()?;
    let allocation: AgePenaltyAllocation = parse_or_default(allocation)?;
    let mut rng = rand::thread_rng();
    let base = characteristics::roll_characteristics(&rulebook, &mut rng);
    let aged = characteristics::apply_age_modifiers(&rulebook, &base, age, &allocation, &mut rng);
    dump(&aged)
}

/// Roll one characteristic with its age modifiers
#[pyfunction]
#[pyo3(signature = (key, age, allocation=None))]
fn roll_characteristic_with_age_modifiers(
    key: &str,
    age: u32,
    allocation: Option<&str>,
) -> PyResult<String> {
    let rulebook = rulebook()?;
    let characteristic = Characteristic::from_str(key)
        .ok_or_else(|| RulesError::InvalidCharacteristic(key.to_string()))?;
    let allocation: AgePenaltyAllocation = parse_or_default(allocation)?;
    let roll = characteristics::roll_characteristic_with_age_modifiers(
        &rulebook,
        characteristic,
        age,
        &allocation,
        &mut rand::thread_rng(),
    );
    dump(&roll)
}

#[pyfunction]
fn compute_derived_stats(block: &str, age: u32) -> PyResult<String> {
    let block: Characteristics = parse(block)?;
    dump(&characteristics::compute_derived_stats(&block, age))
}

#[pyfunction]
#[pyo3(signature = (points_formula, block, choices=None))]
fn evaluate_occupation_points_formula(
    points_formula: &str,
    block: &str,
    choices: Option<&str>,
) -> PyResult<i32> {
    let block: Characteristics = parse(block)?;
    let choices: FormulaChoices = parse_or_default(choices)?;
    Ok(formula::evaluate_occupation_points_formula(points_formula, &block, &choices))
}

#[pyfunction]
fn extract_occupation_formula_choice_groups(points_formula: &str) -> PyResult<String> {
    dump(&formula::extract_occupation_formula_choice_groups(points_formula))
}

/// Skills of the draft's occupation that may take occupation points
#[pyfunction]
fn collect_allowed_occupation_skills(draft: &str) -> PyResult<Vec<String>> {
    let rulebook = rulebook()?;
    let draft: Draft = parse(draft)?;
    let selection = draft.occupation.as_ref().ok_or(RulesError::NoOccupationSelected)?;
    let definition = rulebook
        .occupation(&selection.name)
        .ok_or_else(|| RulesError::OccupationNotFound(selection.name.clone()))?;
    Ok(occupation::collect_allowed_occupation_skills(
        &rulebook, definition, selection,
    ))
}

#[pyfunction]
fn compute_skill_breakdown(draft: &str) -> PyResult<String> {
    let rulebook = rulebook()?;
    let draft: Draft = parse(draft)?;
    dump(&skills::compute_draft_skill_breakdown(&rulebook, &draft))
}

/// Validation issues of the draft up to `stage` (clamped to 1..=10)
#[pyfunction]
fn validate_step(stage: i64, draft: &str) -> PyResult<String> {
    let rulebook = rulebook()?;
    let draft: Draft = parse(draft)?;
    dump(&validation::validate_step(&rulebook, clamp_stage(stage), &draft).issues)
}

/// Seal the draft into a character sheet
///
/// # Raises
/// RuntimeError listing every issue when the draft is not valid
#[pyfunction]
fn finalize_character(draft: &str) -> PyResult<String> {
    let rulebook = rulebook()?;
    let draft: Draft = parse(draft)?;
    Ok(draft::finalize_character(&rulebook, &draft)?.to_json()?)
}

/// Seal the draft on a blocking thread so the asyncio loop stays responsive
///
/// # Example (Python)
/// ```python
/// sheet = json.loads(await finalize_character_async(json.dumps(draft)))
/// ```
#[pyfunction]
fn finalize_character_async(py: Python<'_>, draft: String) -> PyResult<Bound<'_, PyAny>> {
    let rulebook = rulebook()?;

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let sheet = tokio::task::spawn_blocking(move || {
            let draft: Draft = serde_json::from_str(&draft).map_err(RulesError::from)?;
            let sheet = draft::finalize_character(&rulebook, &draft)?;
            sheet.to_json()
        })
        .await
        .map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Finalization task panicked: {}",
                e
            ))
        })?
        .map_err(PyErr::from)?;

        Ok(sheet)
    })
}

// ============================================================================
// Python Module Definition
// ============================================================================

#[pymodule]
fn investigator_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_rulebook, m)?)?;
    m.add_function(wrap_pyfunction!(is_rulebook_initialized, m)?)?;
    m.add_function(wrap_pyfunction!(roll_characteristics, m)?)?;
    m.add_function(wrap_pyfunction!(roll_characteristic_with_age_modifiers, m)?)?;
    m.add_function(wrap_pyfunction!(compute_derived_stats, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_occupation_points_formula, m)?)?;
    m.add_function(wrap_pyfunction!(extract_occupation_formula_choice_groups, m)?)?;
    m.add_function(wrap_pyfunction!(collect_allowed_occupation_skills, m)?)?;
    m.add_function(wrap_pyfunction!(compute_skill_breakdown, m)?)?;
    m.add_function(wrap_pyfunction!(validate_step, m)?)?;
    m.add_function(wrap_pyfunction!(finalize_character, m)?)?;
    m.add_function(wrap_pyfunction!(finalize_character_async, m)?)?;
    Ok(())
}
