//! Skill point allocations
//!
//! Keys are display names as the operator typed them. Lookups and sums go
//! through the normalized name so "Psicologia" and "Psicología" share points.

use crate::skills::normalize::{is_credit_skill, normalize_skill_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occupation and personal-interest points per skill
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAllocation {
    #[serde(default)]
    pub occupation: BTreeMap<String, u32>,
    #[serde(default)]
    pub personal: BTreeMap<String, u32>,
}

impl SkillAllocation {
    /// Occupation points on a skill, merged across spellings
    pub fn occupation_points(&self, skill: &str) -> i32 {
        points_for(&self.occupation, skill)
    }

    /// Personal points on a skill, merged across spellings
    pub fn personal_points(&self, skill: &str) -> i32 {
        points_for(&self.personal, skill)
    }

    /// Occupation points spent, Crédito excluded
    pub fn occupation_spent(&self) -> i32 {
        spent(&self.occupation)
    }

    /// Personal points spent, Crédito excluded
    pub fn personal_spent(&self) -> i32 {
        spent(&self.personal)
    }

    /// Replace the occupation points of a skill; 0 removes it
    pub fn set_occupation(&mut self, skill: &str, points: u32) {
        set_points(&mut self.occupation, skill, points);
    }

    /// Replace the personal points of a skill; 0 removes it
    pub fn set_personal(&mut self, skill: &str, points: u32) {
        set_points(&mut self.personal, skill, points);
    }

    /// Occupation points grouped by normalized name, in first-seen display
    /// spelling
    pub fn merged_occupation(&self) -> Vec<(String, i32)> {
        merged(&self.occupation)
    }

    /// Personal points grouped by normalized name, in first-seen display
    /// spelling
    pub fn merged_personal(&self) -> Vec<(String, i32)> {
        merged(&self.personal)
    }
}

/// Sums run in u64 and saturate at `i32::MAX`, so oversized allocations
/// still trip every cap and budget check
#[inline]
fn saturate(sum: u64) -> i32 {
    i32::try_from(sum).unwrap_or(i32::MAX)
}

fn points_for(map: &BTreeMap<String, u32>, skill: &str) -> i32 {
    let key = normalize_skill_name(skill);
    saturate(
        map.iter()
            .filter(|(name, _)| normalize_skill_name(name) == key)
            .map(|(_, &points)| u64::from(points))
            .sum(),
    )
}

fn spent(map: &BTreeMap<String, u32>) -> i32 {
    saturate(
        map.iter()
            .filter(|(name, _)| !is_credit_skill(name))
            .map(|(_, &points)| u64::from(points))
            .sum(),
    )
}

fn set_points(map: &mut BTreeMap<String, u32>, skill: &str, points: u32) {
    let key = normalize_skill_name(skill);
    map.retain(|name, _| normalize_skill_name(name) != key);
    if points > 0 {
        map.insert(skill.trim().to_string(), points);
    }
}

fn merged(map: &BTreeMap<String, u32>) -> Vec<(String, i32)> {
    let mut out: Vec<(String, String, u64)> = Vec::with_capacity(map.len());
    for (name, &points) in map {
        let key = normalize_skill_name(name);
        match out.iter_mut().find(|(k, _, _)| *k == key) {
            Some(entry) => entry.2 += u64::from(points),
            None => out.push((key, name.clone(), u64::from(points))),
        }
    }
    out.into_iter()
        .map(|(_, name, points)| (name, saturate(points)))
        .collect()
}
