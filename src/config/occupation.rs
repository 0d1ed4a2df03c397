//! Occupation catalog structures

use serde::Deserialize;

/// Occupation template
#[derive(Debug, Clone, Deserialize)]
pub struct OccupationDefinition {
    pub name: String,
    pub credit_rating: CreditRange,
    /// Point-budget formula, e.g. "EDU x 2 + (DES x 2 o FUE x 2)"
    pub points_formula: String,
    /// Flat skill grants; entries may be alternatives ("Trepar o Nadar"),
    /// generic families ("Combatir") or wildcards ("Cualquier habilidad")
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub choice_groups: Vec<ChoiceGroupDefinition>,
}

/// Inclusive credit rating range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreditRange {
    pub min: i32,
    pub max: i32,
}

impl CreditRange {
    #[inline]
    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// "Pick `count` of `options`" skill grant
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceGroupDefinition {
    pub label: String,
    pub count: usize,
    pub options: Vec<String>,
}
