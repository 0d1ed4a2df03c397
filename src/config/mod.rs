//! Rulebook reference data
//!
//! The rulebook (characteristic generation formulas, skill catalog, occupations
//! and finance bands) is deserialized from JSON once and then only read. Every
//! formula is parsed while loading so malformed content fails here and never
//! at roll time.

mod finance;
mod occupation;
mod skill;

pub use finance::*;
pub use occupation::*;
pub use skill::*;

use crate::characteristics::Characteristic;
use crate::error::{Result, RulesError};
use crate::formula::{get_or_parse, DiceFormula};
use crate::skills::{normalize_skill_name, skill_family, CREDIT_SKILL};
use ahash::AHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Rulebook shipped with the crate
pub const BUILTIN_RULEBOOK_JSON: &str = include_str!("../../data/rulebook.json");

/// Raw rulebook document
#[derive(Debug, Clone, Deserialize)]
struct RulebookData {
    characteristics: BTreeMap<String, String>,
    #[serde(default)]
    skill_families: Vec<SkillFamily>,
    skills: Vec<SkillDefinition>,
    occupations: Vec<OccupationDefinition>,
    #[serde(default)]
    finance: Vec<FinanceBand>,
}

/// Validated, indexed rulebook
#[derive(Debug, Clone)]
pub struct Rulebook {
    generation: BTreeMap<Characteristic, DiceFormula>,
    skills: Vec<SkillDefinition>,
    families: Vec<SkillFamily>,
    occupations: Vec<OccupationDefinition>,
    finance: Vec<FinanceBand>,
    // Indices keyed by normalized name
    skill_index: AHashMap<String, usize>,
    family_index: AHashMap<String, usize>,
    occupation_index: AHashMap<String, usize>,
    specializations: AHashMap<String, Vec<usize>>,
}

impl Rulebook {
    /// Load and validate a rulebook from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let data: RulebookData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// Load the rulebook embedded in the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_RULEBOOK_JSON)
    }

    fn from_data(data: RulebookData) -> Result<Self> {
        let mut generation = BTreeMap::new();
        for (key, formula) in &data.characteristics {
            let characteristic = Characteristic::from_str(key)
                .ok_or_else(|| RulesError::InvalidCharacteristic(key.clone()))?;
            generation.insert(characteristic, DiceFormula::parse(formula)?);
        }
        if let Some(missing) = Characteristic::ALL
            .iter()
            .find(|c| !generation.contains_key(*c))
        {
            return Err(RulesError::Catalog(format!(
                "No generation formula for {}",
                missing
            )));
        }

        let mut skill_index = AHashMap::with_capacity(data.skills.len());
        let mut specializations: AHashMap<String, Vec<usize>> = AHashMap::new();
        for (i, skill) in data.skills.iter().enumerate() {
            let key = normalize_skill_name(&skill.name);
            if skill_index.insert(key.clone(), i).is_some() {
                return Err(RulesError::Catalog(format!("Duplicate skill: {}", skill.name)));
            }
            if let Some((family, _)) = skill_family(&key) {
                specializations.entry(family.to_string()).or_default().push(i);
            }
        }

        let family_index = data
            .skill_families
            .iter()
            .enumerate()
            .map(|(i, family)| (normalize_skill_name(&family.name), i))
            .collect();

        let mut occupation_index = AHashMap::with_capacity(data.occupations.len());
        for (i, occupation) in data.occupations.iter().enumerate() {
            let key = normalize_skill_name(&occupation.name);
            if occupation_index.insert(key, i).is_some() {
                return Err(RulesError::Catalog(format!(
                    "Duplicate occupation: {}",
                    occupation.name
                )));
            }
            let range = occupation.credit_rating;
            if range.min < 0 || range.min > range.max || range.max > 99 {
                return Err(RulesError::Catalog(format!(
                    "Invalid credit rating range {}-{} for {}",
                    range.min, range.max, occupation.name
                )));
            }
            get_or_parse(&occupation.points_formula)
                .validate()
                .map_err(|e| match e {
                    RulesError::InvalidFormula(msg) => {
                        RulesError::InvalidFormula(format!("{} ({})", msg, occupation.name))
                    }
                    other => other,
                })?;
            for group in &occupation.choice_groups {
                if group.count == 0 || group.options.is_empty() {
                    return Err(RulesError::Catalog(format!(
                        "Empty choice group '{}' for {}",
                        group.label, occupation.name
                    )));
                }
            }
        }

        for band in &data.finance {
            if band.min > band.max {
                return Err(RulesError::Catalog(format!(
                    "Invalid finance band {}-{}",
                    band.min, band.max
                )));
            }
        }

        tracing::debug!(
            skills = data.skills.len(),
            occupations = data.occupations.len(),
            "rulebook loaded"
        );

        Ok(Self {
            generation,
            skills: data.skills,
            families: data.skill_families,
            occupations: data.occupations,
            finance: data.finance,
            skill_index,
            family_index,
            occupation_index,
            specializations,
        })
    }

    /// Generation formula for a characteristic
    #[inline]
    pub fn generation_formula(&self, characteristic: Characteristic) -> &DiceFormula {
        // Presence of all nine is checked while loading
        &self.generation[&characteristic]
    }

    pub fn skills(&self) -> &[SkillDefinition] {
        &self.skills
    }

    pub fn occupations(&self) -> &[OccupationDefinition] {
        &self.occupations
    }

    pub fn finance_bands(&self) -> &[FinanceBand] {
        &self.finance
    }

    /// Look up a skill by any spelling that normalizes to the catalog name
    pub fn skill(&self, name: &str) -> Option<&SkillDefinition> {
        self.skill_index
            .get(&normalize_skill_name(name))
            .map(|&i| &self.skills[i])
    }

    /// Look up a family base entry, e.g. "Ciencia"
    pub fn family(&self, name: &str) -> Option<&SkillFamily> {
        self.family_index
            .get(&normalize_skill_name(name))
            .map(|&i| &self.families[i])
    }

    /// Cataloged specializations of a family, e.g. every "Combatir (X)"
    pub fn specializations_of(&self, family: &str) -> Vec<&SkillDefinition> {
        self.specializations
            .get(&normalize_skill_name(family))
            .map(|indices| indices.iter().map(|&i| &self.skills[i]).collect())
            .unwrap_or_default()
    }

    pub fn occupation(&self, name: &str) -> Option<&OccupationDefinition> {
        self.occupation_index
            .get(&normalize_skill_name(name))
            .map(|&i| &self.occupations[i])
    }

    /// Skills that may not receive personal-interest points at creation
    pub fn is_forbidden_at_creation(&self, name: &str) -> bool {
        let key = normalize_skill_name(name);
        if key == normalize_skill_name(CREDIT_SKILL) {
            return true;
        }
        self.skill_index
            .get(&key)
            .map(|&i| self.skills[i].forbidden_at_creation)
            .unwrap_or(false)
    }

    /// Finances for a credit rating
    pub fn finances(&self, credit_rating: i32) -> Option<Finances> {
        finance_for_credit(&self.finance, credit_rating)
    }
}
