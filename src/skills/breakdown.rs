//! Per-skill breakdown: base, occupation points, personal points and the
//! hard/extreme thresholds of the resulting total.

use crate::characteristics::Characteristics;
use crate::config::Rulebook;
use crate::draft::Draft;
use crate::occupation::collect_allowed_occupation_skills;
use crate::skills::allocation::SkillAllocation;
use crate::skills::normalize::{
    normalize_skill_name, skill_family, CREDIT_SKILL, DODGE_SKILL, OWN_LANGUAGE_SKILL,
};
use ahash::AHashSet;
use serde::Serialize;

/// One row of the skill sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillBreakdownEntry {
    pub name: String,
    pub base: i32,
    pub occupation: i32,
    pub personal: i32,
    pub total: i32,
    pub hard: i32,
    pub extreme: i32,
}

/// Base value of a skill before allocation.
///
/// "Lengua propia" uses EDU and "Esquivar" half of DES. An unlisted
/// specialization falls back to its family's base; unknown names are 0.
pub fn base_skill_value(
    rulebook: &Rulebook,
    characteristics: &Characteristics,
    name: &str,
) -> i32 {
    let key = normalize_skill_name(name);
    let family = skill_family(&key).map(|(family, _)| family);
    let is = |skill: &str| {
        let target = normalize_skill_name(skill);
        key == target || family == Some(target.as_str())
    };

    if is(OWN_LANGUAGE_SKILL) {
        return characteristics.edu;
    }
    if is(DODGE_SKILL) {
        return characteristics.des / 2;
    }
    if let Some(skill) = rulebook.skill(&key) {
        return skill.base;
    }
    family
        .and_then(|family| rulebook.family(family))
        .or_else(|| rulebook.family(&key))
        .map(|family| family.base)
        .unwrap_or(0)
}

/// Breakdown for every catalog skill plus anything the allocation mentions
pub fn compute_skill_breakdown(
    rulebook: &Rulebook,
    characteristics: &Characteristics,
    allocation: &SkillAllocation,
) -> Vec<SkillBreakdownEntry> {
    breakdown_for(rulebook, characteristics, allocation, std::iter::empty())
}

/// Breakdown of a draft: the occupation's resolved grants are listed and the
/// credit rating is reported as Crédito's occupation points
pub fn compute_draft_skill_breakdown(
    rulebook: &Rulebook,
    draft: &Draft,
) -> Vec<SkillBreakdownEntry> {
    let characteristics = draft.characteristics_or_zero();
    let mut allocation = draft.skills.clone();
    let mut granted = Vec::new();

    if let Some(selection) = &draft.occupation {
        allocation.set_occupation(CREDIT_SKILL, selection.credit_rating.max(0) as u32);
        if let Some(occupation) = rulebook.occupation(&selection.name) {
            granted = collect_allowed_occupation_skills(rulebook, occupation, selection);
        }
    }

    breakdown_for(rulebook, &characteristics, &allocation, granted.into_iter())
}

fn breakdown_for<I>(
    rulebook: &Rulebook,
    characteristics: &Characteristics,
    allocation: &SkillAllocation,
    extra: I,
) -> Vec<SkillBreakdownEntry>
where
    I: Iterator<Item = String>,
{
    // First display spelling wins, catalog first
    let mut names: Vec<String> = Vec::with_capacity(rulebook.skills().len());
    let mut seen = AHashSet::with_capacity(rulebook.skills().len());
    let catalog = rulebook.skills().iter().map(|skill| skill.name.clone());
    let allocated = allocation
        .merged_occupation()
        .into_iter()
        .chain(allocation.merged_personal())
        .map(|(name, _)| name);

    for name in catalog.chain(extra).chain(allocated) {
        if seen.insert(normalize_skill_name(&name)) {
            names.push(name);
        }
    }

    names
        .into_iter()
        .map(|name| {
            let base = base_skill_value(rulebook, characteristics, &name);
            let occupation = allocation.occupation_points(&name);
            let personal = allocation.personal_points(&name);
            let total = base.saturating_add(occupation).saturating_add(personal);
            SkillBreakdownEntry {
                name,
                base,
                occupation,
                personal,
                total,
                hard: total / 2,
                extreme: total / 5,
            }
        })
        .collect()
}
