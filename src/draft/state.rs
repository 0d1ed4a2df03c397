//! Draft state and transitions
//!
//! The draft is plain data owned by the caller. Transitions keep the
//! bookkeeping consistent (when characteristics were rolled, which choices
//! survive an occupation change) but never validate; that is the job of
//! [`crate::validation::validate_step`].

use crate::characteristics::{
    apply_age_modifiers, roll_characteristics, AgePenaltyAllocation, AgedCharacteristics,
    Characteristic, Characteristics,
};
use crate::config::{format_money, Rulebook};
use crate::error::{Result, RulesError};
use crate::formula::fill_missing_formula_choices;
use crate::occupation::OccupationSelection;
use crate::skills::{normalize_skill_name, SkillAllocation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Age a fresh draft starts at
pub const DEFAULT_AGE: u32 = 25;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub name: String,
    pub player: String,
    pub gender: String,
    pub residence: String,
    pub birthplace: String,
}

/// Background categories plus the mandatory core bond
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Background {
    pub description: String,
    pub ideology: String,
    pub significant_people: String,
    pub meaningful_locations: String,
    pub treasured_possessions: String,
    pub traits: String,
    /// The one bond the investigator holds above all others
    pub core_bond: String,
}

impl Background {
    /// Number of the six categories with content
    pub fn filled_categories(&self) -> usize {
        [
            &self.description,
            &self.ideology,
            &self.significant_people,
            &self.meaningful_locations,
            &self.treasured_possessions,
            &self.traits,
        ]
        .iter()
        .filter(|text| !text.trim().is_empty())
        .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Companion {
    pub name: String,
    pub relationship: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentSummary {
    pub spending_level: String,
    pub cash: String,
    pub assets: String,
    pub notes: String,
    pub items: Vec<String>,
}

impl EquipmentSummary {
    /// Names of the required fields that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("spending_level", &self.spending_level),
            ("cash", &self.cash),
            ("assets", &self.assets),
            ("notes", &self.notes),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Investigator under construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    pub identity: Identity,
    pub age: u32,
    pub age_penalties: AgePenaltyAllocation,
    /// May be partial until every characteristic has been rolled
    pub characteristics: BTreeMap<Characteristic, i32>,
    /// Age at which the characteristics were rolled
    pub rolled_at_age: Option<u32>,
    pub occupation: Option<OccupationSelection>,
    pub skills: SkillAllocation,
    pub background: Background,
    pub companions: Vec<Companion>,
    pub equipment: EquipmentSummary,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            age: DEFAULT_AGE,
            age_penalties: AgePenaltyAllocation::default(),
            characteristics: BTreeMap::new(),
            rolled_at_age: None,
            occupation: None,
            skills: SkillAllocation::default(),
            background: Background::default(),
            companions: Vec::new(),
            equipment: EquipmentSummary::default(),
        }
    }
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to a fresh draft
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Change the age. Rolled characteristics are kept and reported stale
    /// until rolled again.
    pub fn set_age(&mut self, age: u32) {
        self.age = age;
    }

    /// Store a complete block rolled at the current age
    pub fn set_characteristics(&mut self, characteristics: Characteristics) {
        self.characteristics = characteristics.to_map();
        self.rolled_at_age = Some(self.age);
    }

    /// Roll every characteristic, apply the age modifiers and store the result
    pub fn roll_characteristics<R: Rng + ?Sized>(
        &mut self,
        rulebook: &Rulebook,
        rng: &mut R,
    ) -> AgedCharacteristics {
        let base = roll_characteristics(rulebook, rng);
        let aged = apply_age_modifiers(rulebook, &base, self.age, &self.age_penalties, rng);
        self.set_characteristics(aged.characteristics);
        aged
    }

    /// Complete block, if all nine are present
    pub fn characteristic_block(&self) -> Option<Characteristics> {
        Characteristics::from_partial(&self.characteristics)
    }

    /// Block with missing characteristics read as 0
    pub fn characteristics_or_zero(&self) -> Characteristics {
        let mut block = Characteristics::default();
        for (&key, &value) in &self.characteristics {
            block.set(key, value);
        }
        block
    }

    /// Select an occupation by name. Re-selecting the current occupation
    /// keeps its choices; any other occupation starts fresh at its minimum
    /// credit rating.
    pub fn select_occupation(&mut self, rulebook: &Rulebook, name: &str) -> Result<()> {
        let definition = rulebook
            .occupation(name)
            .ok_or_else(|| RulesError::OccupationNotFound(name.to_string()))?;

        let same = self
            .occupation
            .as_ref()
            .map(|current| {
                normalize_skill_name(&current.name) == normalize_skill_name(&definition.name)
            })
            .unwrap_or(false);
        if !same {
            tracing::debug!(occupation = %definition.name, "occupation selected");
            self.occupation = Some(OccupationSelection::new(
                definition.name.clone(),
                definition.credit_rating.min,
            ));
        }
        Ok(())
    }

    fn selection_mut(&mut self) -> Result<&mut OccupationSelection> {
        self.occupation
            .as_mut()
            .ok_or(RulesError::NoOccupationSelected)
    }

    pub fn set_credit_rating(&mut self, credit_rating: i32) -> Result<()> {
        self.selection_mut()?.credit_rating = credit_rating;
        Ok(())
    }

    /// Store the picks of one choice group of the selected occupation
    pub fn set_choice(&mut self, group_index: usize, skills: Vec<String>) -> Result<()> {
        self.selection_mut()?.set_choices(group_index, skills);
        Ok(())
    }

    /// Store the branch picked for one point-formula choice group
    pub fn set_formula_choice(&mut self, key: usize, option: impl Into<String>) -> Result<()> {
        self.selection_mut()?
            .formula_choices
            .insert(key, option.into());
        Ok(())
    }

    /// Default unresolved formula branches to the best-scoring ones
    pub fn fill_best_formula_choices(&mut self, rulebook: &Rulebook) -> Result<usize> {
        let characteristics = self.characteristics_or_zero();
        let selection = self
            .occupation
            .as_mut()
            .ok_or(RulesError::NoOccupationSelected)?;
        let definition = rulebook
            .occupation(&selection.name)
            .ok_or_else(|| RulesError::OccupationNotFound(selection.name.clone()))?;

        Ok(fill_missing_formula_choices(
            &definition.points_formula,
            &characteristics,
            &mut selection.formula_choices,
        ))
    }

    pub fn allocate_occupation(&mut self, skill: &str, points: u32) {
        self.skills.set_occupation(skill, points);
    }

    pub fn allocate_personal(&mut self, skill: &str, points: u32) {
        self.skills.set_personal(skill, points);
    }

    /// Fill empty money fields from the finance band of the credit rating.
    /// Fields the operator already wrote are left alone.
    pub fn suggest_equipment(&mut self, rulebook: &Rulebook) -> Result<()> {
        let credit_rating = self
            .occupation
            .as_ref()
            .ok_or(RulesError::NoOccupationSelected)?
            .credit_rating;
        let Some(finances) = rulebook.finances(credit_rating) else {
            tracing::warn!(credit_rating, "no finance band covers credit rating");
            return Ok(());
        };

        let fill = |field: &mut String, amount: f64| {
            if field.trim().is_empty() {
                *field = format_money(amount);
            }
        };
        fill(&mut self.equipment.spending_level, finances.spending_level);
        fill(&mut self.equipment.cash, finances.cash);
        fill(&mut self.equipment.assets, finances.assets);
        Ok(())
    }
}
