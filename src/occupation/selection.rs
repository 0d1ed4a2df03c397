//! Occupation selection stored on the draft

use crate::formula::FormulaChoices;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies one choice group of one occupation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChoiceGroupRef {
    pub occupation: String,
    pub group_index: usize,
}

impl ChoiceGroupRef {
    pub fn new(occupation: impl Into<String>, group_index: usize) -> Self {
        Self {
            occupation: occupation.into(),
            group_index,
        }
    }
}

/// The operator's occupation, credit rating and choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationSelection {
    pub name: String,
    pub credit_rating: i32,
    #[serde(default, with = "super::choice_map")]
    pub choices: BTreeMap<ChoiceGroupRef, Vec<String>>,
    /// Selected branch per point-formula choice group
    #[serde(default)]
    pub formula_choices: FormulaChoices,
}

impl OccupationSelection {
    pub fn new(name: impl Into<String>, credit_rating: i32) -> Self {
        Self {
            name: name.into(),
            credit_rating,
            choices: BTreeMap::new(),
            formula_choices: FormulaChoices::new(),
        }
    }

    #[inline]
    pub fn group_ref(&self, group_index: usize) -> ChoiceGroupRef {
        ChoiceGroupRef::new(self.name.clone(), group_index)
    }

    /// Skills picked for a choice group of this occupation
    pub fn choices_for(&self, group_index: usize) -> &[String] {
        self.choices
            .get(&self.group_ref(group_index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_choices(&mut self, group_index: usize, skills: Vec<String>) {
        let key = self.group_ref(group_index);
        if skills.is_empty() {
            self.choices.remove(&key);
        } else {
            self.choices.insert(key, skills);
        }
    }
}
