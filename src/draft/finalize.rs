//! Finalizer: seals a fully valid draft into a [`CharacterSheet`]

use crate::characteristics::{
    compute_derived_stats, Characteristic, Characteristics, DerivedStats, CHARACTERISTIC_MAX,
};
use crate::config::{Finances, Rulebook};
use crate::draft::state::{Background, Companion, Draft, EquipmentSummary, Identity};
use crate::error::{Result, RulesError};
use crate::formula::{evaluate_occupation_points_formula, FormulaChoices};
use crate::occupation::collect_allowed_occupation_skills;
use crate::skills::{
    compute_draft_skill_breakdown, same_skill, SkillAllocation, SkillBreakdownEntry,
};
use crate::validation::{validate_step, FINAL_STAGE};
use serde::Serialize;
use std::collections::BTreeMap;

/// Occupation as printed on the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupationSummary {
    pub name: String,
    pub credit_rating: i32,
    pub points_formula: String,
    pub occupation_points: i32,
    pub formula_choices: FormulaChoices,
    /// Picks per choice group label
    pub choices: BTreeMap<String, Vec<String>>,
    /// Every skill that could take occupation points
    pub skills: Vec<String>,
}

/// Immutable, internally consistent investigator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterSheet {
    identity: Identity,
    age: u32,
    characteristics: Characteristics,
    derived: DerivedStats,
    occupation: OccupationSummary,
    finances: Option<Finances>,
    skills: SkillAllocation,
    skill_breakdown: Vec<SkillBreakdownEntry>,
    background: Background,
    companions: Vec<Companion>,
    equipment: EquipmentSummary,
}

impl CharacterSheet {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn characteristics(&self) -> &Characteristics {
        &self.characteristics
    }

    pub fn derived(&self) -> &DerivedStats {
        &self.derived
    }

    pub fn occupation(&self) -> &OccupationSummary {
        &self.occupation
    }

    pub fn finances(&self) -> Option<&Finances> {
        self.finances.as_ref()
    }

    pub fn skills(&self) -> &SkillAllocation {
        &self.skills
    }

    pub fn skill_breakdown(&self) -> &[SkillBreakdownEntry] {
        &self.skill_breakdown
    }

    /// Breakdown row of one skill, by any spelling
    pub fn skill(&self, name: &str) -> Option<&SkillBreakdownEntry> {
        self.skill_breakdown
            .iter()
            .find(|row| same_skill(&row.name, name))
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn companions(&self) -> &[Companion] {
        &self.companions
    }

    pub fn equipment(&self) -> &EquipmentSummary {
        &self.equipment
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Validate the draft at the final stage and seal it.
///
/// Fails with every issue found when any error remains. Calling it twice on
/// an unchanged draft yields identical sheets.
pub fn finalize_character(rulebook: &Rulebook, draft: &Draft) -> Result<CharacterSheet> {
    let report = validate_step(rulebook, FINAL_STAGE, draft);
    if report.has_errors() {
        tracing::debug!(errors = report.errors().count(), "finalization refused");
        return Err(RulesError::Finalization {
            issues: report.into_issues(),
        });
    }

    let mut characteristics = draft.characteristic_block().ok_or_else(|| {
        RulesError::InvalidCharacteristic("characteristic block is incomplete".to_string())
    })?;
    characteristics.edu = characteristics.edu.min(CHARACTERISTIC_MAX);

    let selection = draft
        .occupation
        .as_ref()
        .ok_or(RulesError::NoOccupationSelected)?;
    let definition = rulebook
        .occupation(&selection.name)
        .ok_or_else(|| RulesError::OccupationNotFound(selection.name.clone()))?;

    // Breakdown from the sealed characteristics, not the raw draft values
    let mut sealed = draft.clone();
    sealed
        .characteristics
        .insert(Characteristic::Edu, characteristics.edu);

    let choices = definition
        .choice_groups
        .iter()
        .enumerate()
        .map(|(index, group)| (group.label.clone(), selection.choices_for(index).to_vec()))
        .collect();

    let occupation = OccupationSummary {
        name: definition.name.clone(),
        credit_rating: selection.credit_rating,
        points_formula: definition.points_formula.clone(),
        occupation_points: evaluate_occupation_points_formula(
            &definition.points_formula,
            &characteristics,
            &selection.formula_choices,
        ),
        formula_choices: selection.formula_choices.clone(),
        choices,
        skills: collect_allowed_occupation_skills(rulebook, definition, selection),
    };

    tracing::debug!(
        name = %draft.identity.name,
        occupation = %definition.name,
        "character finalized"
    );

    Ok(CharacterSheet {
        identity: draft.identity.clone(),
        age: draft.age,
        derived: compute_derived_stats(&characteristics, draft.age),
        characteristics,
        occupation,
        finances: rulebook.finances(selection.credit_rating),
        skills: draft.skills.clone(),
        skill_breakdown: compute_draft_skill_breakdown(rulebook, &sealed),
        background: draft.background.clone(),
        companions: draft.companions.clone(),
        equipment: draft.equipment.clone(),
    })
}
