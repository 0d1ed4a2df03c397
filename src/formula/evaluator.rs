//! Point-budget formula evaluator

use crate::characteristics::Characteristics;
use crate::formula::ast::{
    ChoiceNode, FormulaChoiceGroup, FormulaChoices, PointsFormula, PointsNode,
};
use serde::Serialize;

/// Guard for the exhaustive pick-highest search
pub const MAX_FORMULA_COMBINATIONS: usize = 4096;

/// Evaluate a formula; unresolved choice groups take their first option
pub fn evaluate(
    formula: &PointsFormula,
    characteristics: &Characteristics,
    choices: &FormulaChoices,
) -> i32 {
    eval_node(&formula.root, characteristics, choices)
}

fn eval_node(
    node: &PointsNode,
    characteristics: &Characteristics,
    choices: &FormulaChoices,
) -> i32 {
    match node {
        PointsNode::Sum(terms) => terms
            .iter()
            .map(|term| eval_node(term, characteristics, choices))
            .fold(0i32, i32::saturating_add),
        PointsNode::Choice(choice) => {
            let branch = selected_branch(choice, choices).unwrap_or(0);
            choice
                .branches
                .get(branch)
                .map(|node| eval_node(node, characteristics, choices))
                .unwrap_or(0)
        }
        PointsNode::Scaled {
            characteristic,
            multiplier,
        } => characteristics.get(*characteristic).saturating_mul(*multiplier),
        PointsNode::Characteristic(characteristic) => characteristics.get(*characteristic),
        PointsNode::Constant(value) => *value,
        PointsNode::Unknown(_) => 0,
    }
}

/// Index of the stored branch, if it is one of the group's literal options.
/// Whitespace and ASCII case are ignored in the comparison.
pub fn selected_branch(choice: &ChoiceNode, choices: &FormulaChoices) -> Option<usize> {
    let stored: String = choices
        .get(&choice.index)?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    choice
        .options
        .iter()
        .position(|option| option.eq_ignore_ascii_case(&stored))
}

/// Every choice group of the formula, ordered by key
pub fn choice_groups(formula: &PointsFormula) -> Vec<FormulaChoiceGroup> {
    let mut groups = Vec::with_capacity(formula.group_count);
    collect_groups(&formula.root, &mut groups);
    groups.sort_by_key(|group| group.key);
    groups
}

fn collect_groups(node: &PointsNode, groups: &mut Vec<FormulaChoiceGroup>) {
    match node {
        PointsNode::Sum(terms) => terms.iter().for_each(|term| collect_groups(term, groups)),
        PointsNode::Choice(choice) => {
            groups.push(FormulaChoiceGroup {
                key: choice.index,
                options: choice.options.clone(),
            });
            choice
                .branches
                .iter()
                .for_each(|branch| collect_groups(branch, groups));
        }
        _ => {}
    }
}

/// Groups whose stored selection is missing or not a literal option
pub fn unresolved_choice_groups(
    formula: &PointsFormula,
    choices: &FormulaChoices,
) -> Vec<FormulaChoiceGroup> {
    let mut unresolved = Vec::new();
    collect_unresolved(&formula.root, choices, &mut unresolved);
    unresolved.sort_by_key(|group| group.key);
    unresolved
}

fn collect_unresolved(
    node: &PointsNode,
    choices: &FormulaChoices,
    unresolved: &mut Vec<FormulaChoiceGroup>,
) {
    match node {
        PointsNode::Sum(terms) => terms
            .iter()
            .for_each(|term| collect_unresolved(term, choices, unresolved)),
        PointsNode::Choice(choice) => {
            if selected_branch(choice, choices).is_none() {
                unresolved.push(FormulaChoiceGroup {
                    key: choice.index,
                    options: choice.options.clone(),
                });
            }
            choice
                .branches
                .iter()
                .for_each(|branch| collect_unresolved(branch, choices, unresolved));
        }
        _ => {}
    }
}

/// Result of the pick-highest search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestChoices {
    pub choices: FormulaChoices,
    pub total: i32,
}

/// Evaluate every combination of branches and keep the best one.
/// Ties keep the earliest combination, where the lowest group key varies
/// slowest. Used to pre-populate defaults only.
pub fn pick_highest(formula: &PointsFormula, characteristics: &Characteristics) -> BestChoices {
    let groups = choice_groups(formula);
    let combinations = groups
        .iter()
        .try_fold(1usize, |acc, group| acc.checked_mul(group.options.len()));

    let first_options: FormulaChoices = groups
        .iter()
        .map(|group| (group.key, group.options[0].clone()))
        .collect();

    match combinations {
        Some(n) if n <= MAX_FORMULA_COMBINATIONS => {}
        _ => {
            tracing::warn!(
                formula = %formula.source,
                groups = groups.len(),
                "too many branch combinations, keeping first options"
            );
            let total = evaluate(formula, characteristics, &first_options);
            return BestChoices {
                choices: first_options,
                total,
            };
        }
    }

    let mut best = BestChoices {
        total: evaluate(formula, characteristics, &first_options),
        choices: first_options,
    };
    let mut indices = vec![0usize; groups.len()];

    // Odometer over the option indices, last group fastest
    while advance(&mut indices, &groups) {
        let choices: FormulaChoices = groups
            .iter()
            .zip(&indices)
            .map(|(group, &i)| (group.key, group.options[i].clone()))
            .collect();
        let total = evaluate(formula, characteristics, &choices);
        if total > best.total {
            best = BestChoices { choices, total };
        }
    }

    best
}

fn advance(indices: &mut [usize], groups: &[FormulaChoiceGroup]) -> bool {
    for pos in (0..indices.len()).rev() {
        indices[pos] += 1;
        if indices[pos] < groups[pos].options.len() {
            return true;
        }
        indices[pos] = 0;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristics::Characteristic;
    use crate::formula::parser::parse;

    fn characteristics() -> Characteristics {
        Characteristics {
            fue: 50,
            con: 40,
            tam: 60,
            des: 70,
            apa: 45,
            int: 65,
            pod: 55,
            edu: 60,
            suerte: 50,
        }
    }

    #[test]
    fn test_scaled_and_sum() {
        let chars = characteristics();
        assert_eq!(evaluate(&parse("EDUx2"), &chars, &FormulaChoices::new()), 120);
        assert_eq!(evaluate(&parse("(FUE+CON)"), &chars, &FormulaChoices::new()), 90);
        assert_eq!(evaluate(&parse("EDU x 4"), &chars, &FormulaChoices::new()), 240);
    }

    #[test]
    fn test_choice_defaults_to_first_option() {
        let formula = parse("EDU x 2 + (DES x 2 o FUE x 2)");
        assert_eq!(
            evaluate(&formula, &characteristics(), &FormulaChoices::new()),
            120 + 140
        );
    }

    #[test]
    fn test_choice_uses_stored_branch() {
        let formula = parse("EDU x 2 + (DES x 2 o FUE x 2)");
        let mut choices = FormulaChoices::new();
        choices.insert(0, "FUE x 2".to_string());
        assert_eq!(evaluate(&formula, &characteristics(), &choices), 120 + 100);

        choices.insert(0, "fuex2".to_string());
        assert_eq!(evaluate(&formula, &characteristics(), &choices), 120 + 100);
    }

    #[test]
    fn test_choice_ignores_non_literal_selection() {
        let formula = parse("EDU x 2 + (DES x 2 o FUE x 2)");
        let mut choices = FormulaChoices::new();
        choices.insert(0, "POD x 2".to_string());
        assert_eq!(evaluate(&formula, &characteristics(), &choices), 120 + 140);
        assert_eq!(unresolved_choice_groups(&formula, &choices).len(), 1);
    }

    #[test]
    fn test_unknown_evaluates_to_zero() {
        let formula = parse("EDUx2+SUELDO");
        assert_eq!(
            evaluate(&formula, &characteristics(), &FormulaChoices::new()),
            120
        );
    }

    #[test]
    fn test_choice_groups_extraction() {
        let groups = choice_groups(&parse("EDU x 2 + (APA x 2 o DES x 2 o FUE x 2)"));
        assert_eq!(
            groups,
            vec![FormulaChoiceGroup {
                key: 0,
                options: vec!["APAx2".into(), "DESx2".into(), "FUEx2".into()],
            }]
        );
        assert!(choice_groups(&parse("EDUx4")).is_empty());
    }

    #[test]
    fn test_pick_highest() {
        let formula = parse("EDU x 2 + (APA x 2 o DES x 2 o FUE x 2)");
        let best = pick_highest(&formula, &characteristics());
        assert_eq!(best.total, 120 + 140);
        assert_eq!(best.choices.get(&0).map(String::as_str), Some("DESx2"));
    }

    #[test]
    fn test_pick_highest_tie_keeps_first() {
        let mut chars = characteristics();
        chars.set(Characteristic::Fue, 70);
        let best = pick_highest(&parse("DESx2OFUEx2"), &chars);
        assert_eq!(best.choices.get(&0).map(String::as_str), Some("DESx2"));
    }

    #[test]
    fn test_pick_highest_nested_groups() {
        let formula = parse("(EDUx2ODESx2)O(FUEx2OCONx2)");
        let best = pick_highest(&formula, &characteristics());
        assert_eq!(best.total, 140);
        assert_eq!(best.choices.get(&0).map(String::as_str), Some("(EDUx2ODESx2)"));
        assert_eq!(best.choices.get(&1).map(String::as_str), Some("DESx2"));
    }

    #[test]
    fn test_pick_highest_combination_cap() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        // 2^13 combinations is over the cap
        let formula = parse(&vec!["(EDUx1OEDUx2)"; 13].join("+"));
        let best = pick_highest(&formula, &characteristics());
        assert_eq!(best.choices.len(), 13);
        assert!(best.choices.values().all(|option| option == "EDUx1"));
        assert_eq!(best.total, 13 * 60);
    }

    #[test]
    fn test_pick_highest_without_groups() {
        let best = pick_highest(&parse("EDUx4"), &characteristics());
        assert!(best.choices.is_empty());
        assert_eq!(best.total, 240);
    }
}
