//! Formula parsing cache - every occupation formula is parsed once per process

use crate::characteristics::Characteristics;
use crate::formula::ast::{FormulaChoiceGroup, FormulaChoices, PointsFormula};
use crate::formula::evaluator::{self, BestChoices};
use crate::formula::parser;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

/// Global formula cache with fast hashing (ahash)
static FORMULA_CACHE: Lazy<RwLock<AHashMap<String, Arc<PointsFormula>>>> =
    Lazy::new(|| RwLock::new(AHashMap::with_capacity(64)));

/// Get or parse a point-budget formula
#[inline]
pub fn get_or_parse(formula: &str) -> Arc<PointsFormula> {
    // Fast path: check read lock first
    {
        let cache = FORMULA_CACHE.read();
        if let Some(parsed) = cache.get(formula) {
            return Arc::clone(parsed);
        }
    }

    let parsed = Arc::new(parser::parse(formula));
    FORMULA_CACHE
        .write()
        .entry(formula.to_string())
        .or_insert_with(|| Arc::clone(&parsed));
    parsed
}

/// Evaluate an occupation point formula against the current characteristics
#[inline]
pub fn evaluate_occupation_points_formula(
    formula: &str,
    characteristics: &Characteristics,
    choices: &FormulaChoices,
) -> i32 {
    evaluator::evaluate(&get_or_parse(formula), characteristics, choices)
}

/// List the "choose one branch" groups of an occupation point formula
pub fn extract_occupation_formula_choice_groups(formula: &str) -> Vec<FormulaChoiceGroup> {
    evaluator::choice_groups(&get_or_parse(formula))
}

/// Best-scoring branch combination, for pre-populating defaults
pub fn best_occupation_formula_choices(
    formula: &str,
    characteristics: &Characteristics,
) -> BestChoices {
    evaluator::pick_highest(&get_or_parse(formula), characteristics)
}

/// Fill unresolved groups with the best-scoring branches. Explicit choices
/// are kept. Returns how many groups were filled.
pub fn fill_missing_formula_choices(
    formula: &str,
    characteristics: &Characteristics,
    choices: &mut FormulaChoices,
) -> usize {
    let parsed = get_or_parse(formula);
    let unresolved = evaluator::unresolved_choice_groups(&parsed, choices);
    if unresolved.is_empty() {
        return 0;
    }

    let best = evaluator::pick_highest(&parsed, characteristics);
    let mut filled = 0;
    for group in unresolved {
        if let Some(option) = best.choices.get(&group.key) {
            choices.insert(group.key, option.clone());
            filled += 1;
        }
    }
    filled
}

/// Clear the formula cache
pub fn clear_cache() {
    FORMULA_CACHE.write().clear();
}

/// Get cache statistics
pub fn cache_size() -> usize {
    FORMULA_CACHE.read().len()
}
