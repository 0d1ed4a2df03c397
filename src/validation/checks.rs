//! Stage checks

use crate::characteristics::{
    allocation_mismatch, Characteristic, CHARACTERISTIC_MAX, CHARACTERISTIC_MIN, MAX_AGE, MIN_AGE,
};
use crate::config::{OccupationDefinition, Rulebook};
use crate::draft::Draft;
use crate::formula::{get_or_parse, unresolved_choice_groups};
use crate::occupation::{
    choice_pool_contains, is_skill_allowed_for_occupation, occupation_budget_summary,
    personal_budget_summary, OccupationSelection,
};
use crate::skills::{compute_draft_skill_breakdown, is_credit_skill, normalize_skill_name};
use crate::validation::issue::{IssueCode, ValidationIssue, ValidationReport};
use crate::validation::stage::*;
use ahash::AHashSet;

/// Hard ceiling for any skill total
pub const SKILL_ABSOLUTE_CAP: i32 = 99;
/// Recommended ceiling at creation for skills that received points
pub const SKILL_CREATION_CAP: i32 = 75;
/// Background categories that must be filled
pub const MIN_BACKGROUND_CATEGORIES: usize = 3;

/// Run every check up to and including `stage`
pub fn validate_step(rulebook: &Rulebook, stage: u8, draft: &Draft) -> ValidationReport {
    let stage = clamp_stage(stage as i64);
    let mut issues = Vec::new();

    check_age(draft, &mut issues);
    if stage >= STAGE_CHARACTERISTICS {
        check_characteristics(draft, &mut issues);
    }
    let occupation = if stage >= STAGE_OCCUPATION {
        check_occupation(rulebook, draft, &mut issues)
    } else {
        None
    };
    if stage >= STAGE_OCCUPATION_CHOICES {
        if let Some((definition, selection)) = occupation {
            check_occupation_choices(rulebook, definition, selection, &mut issues);
        }
    }
    if stage >= STAGE_OCCUPATION_SKILLS {
        check_occupation_skills(rulebook, draft, occupation, &mut issues);
    }
    if stage >= STAGE_PERSONAL_SKILLS {
        check_personal_skills(rulebook, draft, &mut issues);
    }
    if stage >= STAGE_IDENTITY {
        check_identity(draft, &mut issues);
    }
    if stage >= STAGE_BACKGROUND {
        check_background(draft, &mut issues);
    }
    if stage >= STAGE_EQUIPMENT {
        check_equipment(draft, &mut issues);
    }

    tracing::debug!(stage, issues = issues.len(), "draft validated");
    ValidationReport { stage, issues }
}

/// Shorthand for `validate_step(..).has_errors()`
pub fn has_errors(rulebook: &Rulebook, stage: u8, draft: &Draft) -> bool {
    validate_step(rulebook, stage, draft).has_errors()
}

/// Shorthand for `validate_step(..).can_advance()`
pub fn can_advance(rulebook: &Rulebook, stage: u8, draft: &Draft) -> bool {
    validate_step(rulebook, stage, draft).can_advance()
}

fn check_age(draft: &Draft, issues: &mut Vec<ValidationIssue>) {
    if !(MIN_AGE..=MAX_AGE).contains(&draft.age) {
        issues.push(ValidationIssue::new(
            IssueCode::AgeOutOfRange,
            "age",
            format!("Age {} is outside {}-{}", draft.age, MIN_AGE, MAX_AGE),
        ));
    }

    if let Some(mismatch) = allocation_mismatch(draft.age, &draft.age_penalties) {
        let (field, what) = if mismatch.youth {
            ("age_penalties.youth", "FUE and TAM")
        } else {
            ("age_penalties.mature", "FUE, CON and DES")
        };
        issues.push(ValidationIssue::new(
            IssueCode::AgePenaltyAllocation,
            field,
            format!(
                "Age penalty on {} must add up to {}, got {}",
                what, mismatch.expected, mismatch.actual
            ),
        ));
    }
}

fn check_characteristics(draft: &Draft, issues: &mut Vec<ValidationIssue>) {
    for key in Characteristic::ALL {
        match draft.characteristics.get(&key) {
            None => issues.push(ValidationIssue::new(
                IssueCode::CharacteristicsMissing,
                format!("characteristics.{}", key),
                format!("{} has not been rolled", key),
            )),
            Some(&value) if !(CHARACTERISTIC_MIN..=CHARACTERISTIC_MAX).contains(&value) => {
                issues.push(ValidationIssue::new(
                    IssueCode::CharacteristicOutOfRange,
                    format!("characteristics.{}", key),
                    format!(
                        "{} is {}, outside {}-{}",
                        key, value, CHARACTERISTIC_MIN, CHARACTERISTIC_MAX
                    ),
                ))
            }
            Some(_) => {}
        }
    }

    if let Some(rolled_at) = draft.rolled_at_age {
        if rolled_at != draft.age && !draft.characteristics.is_empty() {
            issues.push(ValidationIssue::new(
                IssueCode::CharacteristicsStaleAge,
                "characteristics",
                format!(
                    "Characteristics were rolled at age {} but age is now {}; roll again",
                    rolled_at, draft.age
                ),
            ));
        }
    }
}

fn check_occupation<'a>(
    rulebook: &'a Rulebook,
    draft: &'a Draft,
    issues: &mut Vec<ValidationIssue>,
) -> Option<(&'a OccupationDefinition, &'a OccupationSelection)> {
    let Some(selection) = draft.occupation.as_ref().filter(|s| !s.name.trim().is_empty()) else {
        issues.push(ValidationIssue::new(
            IssueCode::OccupationMissing,
            "occupation",
            "No occupation selected",
        ));
        return None;
    };

    let Some(definition) = rulebook.occupation(&selection.name) else {
        issues.push(ValidationIssue::new(
            IssueCode::OccupationUnknown,
            "occupation.name",
            format!("Unknown occupation: {}", selection.name),
        ));
        return None;
    };

    let range = definition.credit_rating;
    if !range.contains(selection.credit_rating) {
        issues.push(ValidationIssue::new(
            IssueCode::CreditRatingOutOfRange,
            "occupation.credit_rating",
            format!(
                "Credit rating {} is outside {}-{} for {}",
                selection.credit_rating, range.min, range.max, definition.name
            ),
        ));
    }

    Some((definition, selection))
}

fn check_occupation_choices(
    rulebook: &Rulebook,
    definition: &OccupationDefinition,
    selection: &OccupationSelection,
    issues: &mut Vec<ValidationIssue>,
) {
    for (index, group) in definition.choice_groups.iter().enumerate() {
        let field = format!("occupation.choices.{}", index);
        let picks: Vec<&str> = selection
            .choices_for(index)
            .iter()
            .map(|pick| pick.trim())
            .filter(|pick| !pick.is_empty())
            .collect();

        if picks.len() != group.count {
            issues.push(ValidationIssue::new(
                IssueCode::OccupationChoiceGroup,
                field.clone(),
                format!(
                    "'{}' needs exactly {} skill(s), {} selected",
                    group.label,
                    group.count,
                    picks.len()
                ),
            ));
        }

        let mut seen = AHashSet::with_capacity(picks.len());
        for pick in picks {
            if !seen.insert(normalize_skill_name(pick)) {
                issues.push(ValidationIssue::new(
                    IssueCode::OccupationChoiceDuplicate,
                    field.clone(),
                    format!("{} selected more than once in '{}'", pick, group.label),
                ));
            } else if !choice_pool_contains(rulebook, group, pick) {
                issues.push(ValidationIssue::new(
                    IssueCode::OccupationChoiceNotAllowed,
                    field.clone(),
                    format!("{} is not an option of '{}'", pick, group.label),
                ));
            } else if rulebook.is_forbidden_at_creation(pick) {
                issues.push(ValidationIssue::new(
                    IssueCode::OccupationChoiceForbidden,
                    field.clone(),
                    format!("{} cannot be chosen at creation", pick),
                ));
            }
        }
    }

    let formula = get_or_parse(&definition.points_formula);
    for group in unresolved_choice_groups(&formula, &selection.formula_choices) {
        issues.push(ValidationIssue::new(
            IssueCode::OccupationFormulaChoice,
            format!("occupation.formula_choices.{}", group.key),
            format!(
                "Choose one of {} for the occupation points formula",
                group.options.join(" / ")
            ),
        ));
    }
}

fn check_occupation_skills(
    rulebook: &Rulebook,
    draft: &Draft,
    occupation: Option<(&OccupationDefinition, &OccupationSelection)>,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some((definition, selection)) = occupation {
        if let Some(budget) = occupation_budget_summary(rulebook, draft) {
            if budget.exceeded() {
                issues.push(ValidationIssue::new(
                    IssueCode::OccupationBudgetExceeded,
                    "skills.occupation",
                    format!(
                        "{} occupation points spent (credit rating included), {} available",
                        budget.spent, budget.total
                    ),
                ));
            }
        }

        for (skill, points) in draft.skills.merged_occupation() {
            if points == 0 || is_credit_skill(&skill) {
                continue;
            }
            if !is_skill_allowed_for_occupation(rulebook, definition, selection, &skill) {
                issues.push(ValidationIssue::new(
                    IssueCode::OccupationSkillNotAllowed,
                    format!("skills.occupation.{}", skill),
                    format!("{} is not an occupation skill of {}", skill, definition.name),
                ));
            }
        }
    }

    for row in compute_draft_skill_breakdown(rulebook, draft) {
        if row.total > SKILL_ABSOLUTE_CAP {
            issues.push(ValidationIssue::new(
                IssueCode::SkillAbsoluteCapExceeded,
                format!("skills.{}", row.name),
                format!("{} totals {}, above {}", row.name, row.total, SKILL_ABSOLUTE_CAP),
            ));
        } else if row.total > SKILL_CREATION_CAP
            && row.occupation + row.personal > 0
            && !is_credit_skill(&row.name)
        {
            issues.push(ValidationIssue::new(
                IssueCode::SkillCreationCapExceeded,
                format!("skills.{}", row.name),
                format!(
                    "{} totals {}, above the creation cap of {}",
                    row.name, row.total, SKILL_CREATION_CAP
                ),
            ));
        }
    }
}

fn check_personal_skills(rulebook: &Rulebook, draft: &Draft, issues: &mut Vec<ValidationIssue>) {
    let budget = personal_budget_summary(draft);
    if budget.exceeded() {
        issues.push(ValidationIssue::new(
            IssueCode::PersonalBudgetExceeded,
            "skills.personal",
            format!(
                "{} personal interest points spent, {} available",
                budget.spent, budget.total
            ),
        ));
    }

    for (skill, points) in draft.skills.merged_personal() {
        if points > 0 && rulebook.is_forbidden_at_creation(&skill) {
            issues.push(ValidationIssue::new(
                IssueCode::SkillForbiddenPersonal,
                format!("skills.personal.{}", skill),
                format!("{} cannot receive personal interest points at creation", skill),
            ));
        }
    }
}

fn check_identity(draft: &Draft, issues: &mut Vec<ValidationIssue>) {
    if draft.identity.name.trim().is_empty() {
        issues.push(ValidationIssue::new(
            IssueCode::IdentityNameMissing,
            "identity.name",
            "The investigator needs a name",
        ));
    }
}

fn check_background(draft: &Draft, issues: &mut Vec<ValidationIssue>) {
    let filled = draft.background.filled_categories();
    if filled < MIN_BACKGROUND_CATEGORIES {
        issues.push(ValidationIssue::new(
            IssueCode::BackgroundInsufficient,
            "background",
            format!(
                "Fill at least {} background categories, {} filled",
                MIN_BACKGROUND_CATEGORIES, filled
            ),
        ));
    }
    if draft.background.core_bond.trim().is_empty() {
        issues.push(ValidationIssue::new(
            IssueCode::BackgroundCoreBondMissing,
            "background.core_bond",
            "The core bond is mandatory",
        ));
    }
}

fn check_equipment(draft: &Draft, issues: &mut Vec<ValidationIssue>) {
    for field in draft.equipment.missing_fields() {
        issues.push(ValidationIssue::new(
            IssueCode::EquipmentFieldMissing,
            format!("equipment.{}", field),
            format!("Equipment {} is empty", field.replace('_', " ")),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristics::{AgePenaltyAllocation, Characteristics};
    use crate::draft::Companion;

    fn rulebook() -> Rulebook {
        Rulebook::builtin().unwrap()
    }

    /// Private investigator with every stage filled in
    fn complete_draft() -> Draft {
        let mut draft = Draft::default();
        draft.set_characteristics(Characteristics {
            fue: 50,
            con: 60,
            tam: 65,
            des: 70,
            apa: 45,
            int: 75,
            pod: 60,
            edu: 70,
            suerte: 55,
        });
        draft.occupation = Some({
            let mut selection = OccupationSelection::new("Investigador privado", 20);
            selection.set_choices(0, vec!["Persuasión".into()]);
            selection.set_choices(1, vec!["Combatir (Pelea)".into()]);
            selection.formula_choices.insert(0, "DESx2".into());
            selection
        });
        // 140 + 140 = 280 points, 20 go to credit rating
        draft.skills.set_occupation("Psicología", 50);
        draft.skills.set_occupation("Descubrir", 40);
        draft.skills.set_occupation("Persuasión", 50);
        draft.skills.set_occupation("Combatir (Pelea)", 40);
        draft.skills.set_occupation("Buscar libros", 30);
        draft.skills.set_occupation("Derecho", 50);
        draft.skills.set_personal("Sigilo", 40);
        draft.skills.set_personal("Escuchar", 40);
        draft.identity.name = "Harvey Walters".into();
        draft.background.ideology = "Racionalista".into();
        draft.background.significant_people = "Su hermana".into();
        draft.background.traits = "Metódico".into();
        draft.background.core_bond = "Su hermana".into();
        draft.companions.push(Companion {
            name: "Wilson".into(),
            relationship: "Socio".into(),
            notes: String::new(),
        });
        draft.equipment.spending_level = "$10".into();
        draft.equipment.cash = "$40".into();
        draft.equipment.assets = "$1,000".into();
        draft.equipment.notes = "Revólver del .38, cámara".into();
        draft
    }

    fn codes(rulebook: &Rulebook, stage: u8, draft: &Draft) -> Vec<IssueCode> {
        validate_step(rulebook, stage, draft).codes()
    }

    #[test]
    fn test_complete_draft_passes_every_stage() {
        let rulebook = rulebook();
        let draft = complete_draft();
        for stage in FIRST_STAGE..=FINAL_STAGE {
            let report = validate_step(&rulebook, stage, &draft);
            assert!(report.issues.is_empty(), "stage {}: {:?}", stage, report.issues);
        }
    }

    #[test]
    fn test_default_draft_stage_one_is_clean() {
        let report = validate_step(&rulebook(), 1, &Draft::default());
        assert!(report.issues.is_empty());
        assert!(report.can_advance());
    }

    #[test]
    fn test_age_out_of_range_is_warning() {
        let mut draft = Draft::default();
        draft.age = 12;
        let report = validate_step(&rulebook(), 1, &draft);
        assert_eq!(report.codes(), vec![IssueCode::AgeOutOfRange]);
        assert!(report.can_advance());
    }

    #[test]
    fn test_age_penalty_allocation_mismatch() {
        let mut draft = Draft::default();
        draft.age = 17;
        draft.age_penalties = AgePenaltyAllocation {
            youth_fue: 1,
            youth_tam: 1,
            ..Default::default()
        };
        assert_eq!(codes(&rulebook(), 1, &draft), vec![IssueCode::AgePenaltyAllocation]);

        draft.age_penalties = AgePenaltyAllocation::suggested(17);
        assert!(codes(&rulebook(), 1, &draft).is_empty());
    }

    #[test]
    fn test_missing_and_stale_characteristics() {
        let rulebook = rulebook();
        let mut draft = Draft::default();
        assert_eq!(
            codes(&rulebook, 2, &draft),
            vec![IssueCode::CharacteristicsMissing; 9]
        );

        draft.set_characteristics(Characteristics::uniform(50));
        draft.characteristics.insert(Characteristic::Pod, 0);
        draft.set_age(30);
        assert_eq!(
            codes(&rulebook, 2, &draft),
            vec![
                IssueCode::CharacteristicOutOfRange,
                IssueCode::CharacteristicsStaleAge
            ]
        );
    }

    #[test]
    fn test_occupation_checks() {
        let rulebook = rulebook();
        let mut draft = complete_draft();

        draft.occupation = None;
        assert_eq!(codes(&rulebook, 4, &draft), vec![IssueCode::OccupationMissing]);

        draft.occupation = Some(OccupationSelection::new("Astronauta", 20));
        assert_eq!(codes(&rulebook, 4, &draft), vec![IssueCode::OccupationUnknown]);

        let mut draft = complete_draft();
        if let Some(selection) = draft.occupation.as_mut() {
            selection.credit_rating = 31;
        }
        assert_eq!(codes(&rulebook, 4, &draft), vec![IssueCode::CreditRatingOutOfRange]);
    }

    #[test]
    fn test_choice_group_issues() {
        let rulebook = rulebook();
        let mut draft = complete_draft();
        if let Some(selection) = draft.occupation.as_mut() {
            selection.set_choices(0, vec!["Persuasión".into(), "persuasion".into()]);
            selection.set_choices(1, vec!["Buscar libros".into()]);
            selection.formula_choices.clear();
        }

        assert_eq!(
            codes(&rulebook, 5, &draft),
            vec![
                IssueCode::OccupationChoiceGroup,
                IssueCode::OccupationChoiceDuplicate,
                IssueCode::OccupationChoiceNotAllowed,
                IssueCode::OccupationFormulaChoice,
            ]
        );
    }

    #[test]
    fn test_forbidden_choice() {
        let rulebook = rulebook();
        let mut draft = complete_draft();
        draft.occupation = Some({
            let mut selection = OccupationSelection::new("Anticuario", 40);
            selection.set_choices(0, vec!["Encanto".into()]);
            selection.set_choices(1, vec!["Mitos de Cthulhu".into()]);
            selection
        });
        assert_eq!(codes(&rulebook, 5, &draft), vec![IssueCode::OccupationChoiceForbidden]);
    }

    #[test]
    fn test_choice_outside_resolved_pool() {
        let rulebook = rulebook();
        let mut draft = complete_draft();
        if let Some(selection) = draft.occupation.as_mut() {
            selection.set_choices(1, vec!["Combatir (Boxeo)".into()]);
        }
        assert_eq!(codes(&rulebook, 5, &draft), vec![IssueCode::OccupationChoiceNotAllowed]);

        if let Some(selection) = draft.occupation.as_mut() {
            selection.set_choices(1, vec!["Combatir".into()]);
        }
        assert!(codes(&rulebook, 5, &draft).is_empty());
    }

    #[test]
    fn test_occupation_skill_issues() {
        let rulebook = rulebook();
        let mut draft = complete_draft();
        draft.skills.set_occupation("Encanto", 10);
        draft.skills.set_occupation("Psicología", 70);
        draft.skills.set_occupation("Descubrir", 80);

        assert_eq!(
            codes(&rulebook, 6, &draft),
            vec![
                IssueCode::OccupationBudgetExceeded,
                IssueCode::OccupationSkillNotAllowed,
                IssueCode::SkillAbsoluteCapExceeded,
                IssueCode::SkillCreationCapExceeded,
            ]
        );
    }

    #[test]
    fn test_oversized_allocation_still_capped() {
        let rulebook = rulebook();
        let mut draft = complete_draft();
        draft.skills.set_occupation("Psicología", 4_294_967_000);

        let row = compute_draft_skill_breakdown(&rulebook, &draft)
            .into_iter()
            .find(|row| row.name == "Psicología")
            .unwrap();
        assert_eq!(row.occupation, i32::MAX);
        assert!(row.total > SKILL_ABSOLUTE_CAP);

        let codes = codes(&rulebook, 6, &draft);
        assert!(codes.contains(&IssueCode::OccupationBudgetExceeded));
        assert!(codes.contains(&IssueCode::SkillAbsoluteCapExceeded));
        assert!(crate::draft::finalize_character(&rulebook, &draft).is_err());
    }

    #[test]
    fn test_personal_skill_issues() {
        let rulebook = rulebook();
        let mut draft = complete_draft();
        draft.skills.set_personal("Mitos de Cthulhu", 10);
        draft.skills.set_personal("Sigilo", 60);
        draft.skills.set_personal("Escuchar", 50);
        draft.skills.set_personal("Nadar", 40);

        // Sigilo 20 + 60 = 80 is over the creation cap
        assert_eq!(
            codes(&rulebook, 7, &draft),
            vec![
                IssueCode::SkillCreationCapExceeded,
                IssueCode::PersonalBudgetExceeded,
                IssueCode::SkillForbiddenPersonal,
            ]
        );
    }

    #[test]
    fn test_later_stage_issues() {
        let rulebook = rulebook();
        let mut draft = complete_draft();
        draft.identity.name = "  ".into();
        draft.background.traits.clear();
        draft.background.core_bond.clear();
        draft.equipment.cash.clear();
        draft.equipment.notes.clear();

        assert_eq!(
            codes(&rulebook, 10, &draft),
            vec![
                IssueCode::IdentityNameMissing,
                IssueCode::BackgroundInsufficient,
                IssueCode::BackgroundCoreBondMissing,
                IssueCode::EquipmentFieldMissing,
                IssueCode::EquipmentFieldMissing,
            ]
        );
        assert_eq!(codes(&rulebook, 8, &draft), vec![IssueCode::IdentityNameMissing]);
    }

    #[test]
    fn test_stage_ids_are_clamped() {
        let rulebook = rulebook();
        let mut draft = complete_draft();
        draft.equipment.assets.clear();
        assert_eq!(validate_step(&rulebook, 0, &draft).stage, 1);
        assert!(validate_step(&rulebook, 0, &draft).issues.is_empty());
        assert_eq!(validate_step(&rulebook, 200, &draft).stage, 10);
        assert!(has_errors(&rulebook, 200, &draft));
        assert!(!can_advance(&rulebook, 10, &draft));
    }

    #[test]
    fn test_private_investigator_scenario() {
        let rulebook = rulebook();
        let mut draft = Draft::default();
        assert_eq!(draft.age, 25);
        draft.set_characteristics(Characteristics::uniform(50));
        draft.select_occupation(&rulebook, "Investigador privado").unwrap();

        assert!(!has_errors(&rulebook, 1, &draft));
        let report = validate_step(&rulebook, 6, &draft);
        assert!(report.has_errors());
        assert!(report.codes().contains(&IssueCode::OccupationChoiceGroup));
        assert!(report.codes().contains(&IssueCode::OccupationFormulaChoice));
        assert!(!report.codes().contains(&IssueCode::CreditRatingOutOfRange));

        let report = validate_step(&rulebook, 10, &draft);
        assert!(report.codes().contains(&IssueCode::BackgroundInsufficient));
        assert!(report.codes().contains(&IssueCode::EquipmentFieldMissing));
    }
}
