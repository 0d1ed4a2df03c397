//! Skill name normalization
//!
//! Names are compared after NFD decomposition with combining marks removed,
//! lowercased, with runs of whitespace collapsed. "Psicología",
//! "psicologia" and " PSICOLOGÍA " are the same skill.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Credit rating skill; fed from the occupation's credit rating
pub const CREDIT_SKILL: &str = "Crédito";
/// Base equals EDU
pub const OWN_LANGUAGE_SKILL: &str = "Lengua propia";
/// Base equals half DES
pub const DODGE_SKILL: &str = "Esquivar";

/// Fold a skill name to its comparison key
pub fn normalize_skill_name(name: &str) -> String {
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split "Family (Specialization)" into its parts
pub fn skill_family(name: &str) -> Option<(&str, &str)> {
    let open = name.find('(')?;
    let close = name.rfind(')')?;
    if close < open {
        return None;
    }
    let family = name[..open].trim();
    let specialization = name[open + 1..close].trim();
    if family.is_empty() || specialization.is_empty() {
        None
    } else {
        Some((family, specialization))
    }
}

#[inline]
pub fn is_credit_skill(name: &str) -> bool {
    normalize_skill_name(name) == "credito"
}

#[inline]
pub fn same_skill(a: &str, b: &str) -> bool {
    normalize_skill_name(a) == normalize_skill_name(b)
}
