//! Skill point budgets

use crate::characteristics::Characteristics;
use crate::config::{OccupationDefinition, Rulebook};
use crate::draft::Draft;
use crate::formula::{evaluate_occupation_points_formula, FormulaChoices};
use serde::Serialize;

/// Points available, spent and left in one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetSummary {
    pub total: i32,
    pub spent: i32,
    pub remaining: i32,
}

impl BudgetSummary {
    pub fn new(total: i32, spent: i32) -> Self {
        Self {
            total,
            spent,
            remaining: total.saturating_sub(spent),
        }
    }

    #[inline]
    pub fn exceeded(&self) -> bool {
        self.spent > self.total
    }
}

/// Occupation points from the occupation's formula
#[inline]
pub fn occupation_points_budget(
    occupation: &OccupationDefinition,
    characteristics: &Characteristics,
    formula_choices: &FormulaChoices,
) -> i32 {
    evaluate_occupation_points_formula(&occupation.points_formula, characteristics, formula_choices)
}

/// Personal-interest points: INT x 2
#[inline]
pub fn personal_points_budget(characteristics: &Characteristics) -> i32 {
    characteristics.int * 2
}

/// Occupation pool of a draft. The credit rating is paid from this pool.
pub fn occupation_budget_summary(rulebook: &Rulebook, draft: &Draft) -> Option<BudgetSummary> {
    let selection = draft.occupation.as_ref()?;
    let occupation = rulebook.occupation(&selection.name)?;
    let total = occupation_points_budget(
        occupation,
        &draft.characteristics_or_zero(),
        &selection.formula_choices,
    );
    let spent = draft
        .skills
        .occupation_spent()
        .saturating_add(selection.credit_rating);
    Some(BudgetSummary::new(total, spent))
}

/// Personal-interest pool of a draft
pub fn personal_budget_summary(draft: &Draft) -> BudgetSummary {
    BudgetSummary::new(
        personal_points_budget(&draft.characteristics_or_zero()),
        draft.skills.personal_spent(),
    )
}
