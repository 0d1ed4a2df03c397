//! Occupation skill resolution
//!
//! Catalog grants are written for people: "Trepar o Nadar" offers either
//! skill, "Combatir" means any cataloged Combatir specialization and
//! "Cualquier habilidad" means any skill at all. This module turns those
//! entries into concrete skill names and answers whether a skill is covered.

use crate::config::{ChoiceGroupDefinition, OccupationDefinition, Rulebook};
use crate::occupation::selection::OccupationSelection;
use crate::skills::{is_credit_skill, normalize_skill_name, same_skill, skill_family, CREDIT_SKILL};
use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;

/// The word "o" between two alternatives
static ALTERNATIVE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+o\s+").expect("valid alternative regex"));

const WILDCARD_MARKER: &str = "cualquier";

/// "Cualquier habilidad", "cualquier especialidad" and similar
#[inline]
pub fn is_wildcard_entry(entry: &str) -> bool {
    normalize_skill_name(entry).contains(WILDCARD_MARKER)
}

fn alternatives(entry: &str) -> impl Iterator<Item = &str> {
    ALTERNATIVE_SEPARATOR
        .split(entry)
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
}

/// Expand one grant entry into concrete skill names
pub fn resolve_skill_entry(rulebook: &Rulebook, entry: &str) -> Vec<String> {
    let mut resolved = Vec::new();
    for alternative in alternatives(entry) {
        if is_wildcard_entry(alternative) {
            return rulebook.skills().iter().map(|s| s.name.clone()).collect();
        }
        if skill_family(alternative).is_none() {
            let specializations = rulebook.specializations_of(alternative);
            if !specializations.is_empty() {
                resolved.extend(specializations.into_iter().map(|s| s.name.clone()));
                continue;
            }
        }
        resolved.push(alternative.to_string());
    }
    dedup_normalized(resolved)
}

/// Every concrete skill a choice group offers
pub fn resolve_choice_pool(rulebook: &Rulebook, group: &ChoiceGroupDefinition) -> Vec<String> {
    dedup_normalized(
        group
            .options
            .iter()
            .flat_map(|option| resolve_skill_entry(rulebook, option))
            .collect(),
    )
}

/// Whether a grant entry covers a skill. Literal matches, generic families
/// covering their specializations and wildcards all count.
pub fn entry_covers(entry: &str, skill: &str) -> bool {
    let key = normalize_skill_name(skill);
    let family = skill_family(&key).map(|(family, _)| family);

    alternatives(entry).any(|alternative| {
        if is_wildcard_entry(alternative) {
            return true;
        }
        let alt_key = normalize_skill_name(alternative);
        alt_key == key || (skill_family(&alt_key).is_none() && family == Some(alt_key.as_str()))
    })
}

/// Whether a pick names one of the group's options or a skill its pool
/// resolves to. A generic family option such as "Combatir" may be picked as is.
pub fn choice_pool_contains(
    rulebook: &Rulebook,
    group: &ChoiceGroupDefinition,
    pick: &str,
) -> bool {
    let literal = group
        .options
        .iter()
        .flat_map(|option| alternatives(option))
        .any(|alternative| !is_wildcard_entry(alternative) && same_skill(alternative, pick));
    literal
        || resolve_choice_pool(rulebook, group)
            .iter()
            .any(|skill| same_skill(skill, pick))
}

/// Keep picks from the group's pool that are allowed at creation and
/// distinct, at most `count` of them
pub fn sanitize_choice_selection(
    rulebook: &Rulebook,
    group: &ChoiceGroupDefinition,
    selection: &[String],
) -> Vec<String> {
    let mut seen = AHashSet::with_capacity(selection.len());
    selection
        .iter()
        .map(|skill| skill.trim())
        .filter(|skill| !skill.is_empty())
        .filter(|skill| choice_pool_contains(rulebook, group, skill))
        .filter(|skill| !rulebook.is_forbidden_at_creation(skill))
        .filter(|skill| seen.insert(normalize_skill_name(skill)))
        .take(group.count)
        .map(str::to_string)
        .collect()
}

/// Concrete skills that may receive occupation points, Crédito included
pub fn collect_allowed_occupation_skills(
    rulebook: &Rulebook,
    occupation: &OccupationDefinition,
    selection: &OccupationSelection,
) -> Vec<String> {
    let mut allowed: Vec<String> = occupation
        .skills
        .iter()
        .flat_map(|entry| resolve_skill_entry(rulebook, entry))
        .collect();

    for (index, group) in occupation.choice_groups.iter().enumerate() {
        for pick in sanitize_choice_selection(rulebook, group, selection.choices_for(index)) {
            allowed.extend(resolve_skill_entry(rulebook, &pick));
        }
    }

    allowed.push(CREDIT_SKILL.to_string());
    dedup_normalized(allowed)
}

/// Whether occupation points may go to `skill`
pub fn is_skill_allowed_for_occupation(
    rulebook: &Rulebook,
    occupation: &OccupationDefinition,
    selection: &OccupationSelection,
    skill: &str,
) -> bool {
    if is_credit_skill(skill) {
        return true;
    }
    if occupation.skills.iter().any(|entry| entry_covers(entry, skill)) {
        return true;
    }
    occupation
        .choice_groups
        .iter()
        .enumerate()
        .flat_map(|(index, group)| {
            sanitize_choice_selection(rulebook, group, selection.choices_for(index))
        })
        .any(|pick| entry_covers(&pick, skill))
}

fn dedup_normalized(names: Vec<String>) -> Vec<String> {
    let mut seen = AHashSet::with_capacity(names.len());
    names
        .into_iter()
        .filter(|name| seen.insert(normalize_skill_name(name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rulebook() -> Rulebook {
        Rulebook::builtin().unwrap()
    }

    fn group(count: usize, options: &[&str]) -> ChoiceGroupDefinition {
        ChoiceGroupDefinition {
            label: "test".into(),
            count,
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_literal_entry_passes_through() {
        assert_eq!(resolve_skill_entry(&rulebook(), "Psicología"), vec!["Psicología"]);
        assert_eq!(resolve_skill_entry(&rulebook(), "Telepatía"), vec!["Telepatía"]);
    }

    #[test]
    fn test_alternatives_split_on_word_o() {
        assert_eq!(
            resolve_skill_entry(&rulebook(), "Trepar o Nadar"),
            vec!["Trepar", "Nadar"]
        );
        // "o" inside a word is not a separator
        assert_eq!(resolve_skill_entry(&rulebook(), "Orientarse"), vec!["Orientarse"]);
    }

    #[test]
    fn test_generic_family_expands() {
        let resolved = resolve_skill_entry(&rulebook(), "Combatir");
        assert_eq!(resolved.len(), 5);
        assert!(resolved.contains(&"Combatir (Pelea)".to_string()));
        assert_eq!(
            resolve_skill_entry(&rulebook(), "Combatir (Pelea)"),
            vec!["Combatir (Pelea)"]
        );
    }

    #[test]
    fn test_wildcard_expands_to_catalog() {
        let rulebook = rulebook();
        assert_eq!(
            resolve_skill_entry(&rulebook, "Cualquier habilidad").len(),
            rulebook.skills().len()
        );
        assert!(is_wildcard_entry("cualquier especialidad"));
    }

    #[test]
    fn test_entry_covers() {
        assert!(entry_covers("Combatir", "Combatir (Boxeo)"));
        assert!(entry_covers("Combatir", "combatir"));
        assert!(!entry_covers("Combatir (Pelea)", "Combatir (Espada)"));
        assert!(entry_covers("Trepar o Nadar", "nadar"));
        assert!(entry_covers("Cualquier habilidad", "Telepatía"));
        assert!(!entry_covers("Psicología", "Psicoanálisis"));
    }

    #[test]
    fn test_sanitize_choice_selection() {
        let rulebook = rulebook();
        let social = group(1, &["Charlatanería", "Encanto", "Intimidar", "Persuasión"]);
        let picks = vec!["Buscar libros".to_string(), "encanto".into(), "Persuasión".into()];
        assert_eq!(sanitize_choice_selection(&rulebook, &social, &picks), vec!["encanto"]);

        let any = group(2, &["Cualquier habilidad"]);
        let picks = vec![
            "Mitos de Cthulhu".to_string(),
            "Crédito".into(),
            "Sigilo".into(),
            "sigilo".into(),
            "Nadar".into(),
        ];
        assert_eq!(
            sanitize_choice_selection(&rulebook, &any, &picks),
            vec!["Sigilo", "Nadar"]
        );

        let field = group(1, &["Cerrajería", "Combatir", "Armas de fuego"]);
        let picks = vec!["Combatir (Boxeo)".to_string(), "Combatir (Espada)".into()];
        assert_eq!(
            sanitize_choice_selection(&rulebook, &field, &picks),
            vec!["Combatir (Espada)"]
        );
    }

    #[test]
    fn test_resolve_choice_pool() {
        let rulebook = rulebook();
        let field = group(1, &["Cerrajería", "Combatir", "Armas de fuego"]);
        let pool = resolve_choice_pool(&rulebook, &field);
        assert_eq!(pool[0], "Cerrajería");
        assert!(pool.contains(&"Combatir (Pelea)".to_string()));
        assert!(pool.contains(&"Armas de fuego (Arma corta)".to_string()));
        assert!(!pool.iter().any(|skill| skill == "Combatir"));

        let any = group(1, &["Cualquier habilidad", "Sigilo"]);
        assert_eq!(resolve_choice_pool(&rulebook, &any).len(), rulebook.skills().len());
    }

    #[test]
    fn test_choice_pool_contains() {
        let rulebook = rulebook();
        let field = group(1, &["Cerrajería", "Combatir", "Armas de fuego"]);
        assert!(choice_pool_contains(&rulebook, &field, "combatir"));
        assert!(choice_pool_contains(&rulebook, &field, "Combatir (Látigo)"));
        assert!(choice_pool_contains(&rulebook, &field, "cerrajeria"));
        // covered by the family but not cataloged
        assert!(!choice_pool_contains(&rulebook, &field, "Combatir (Boxeo)"));
        assert!(!choice_pool_contains(&rulebook, &field, "Sigilo"));

        let any = group(1, &["Cualquier habilidad"]);
        assert!(choice_pool_contains(&rulebook, &any, "Sigilo"));
        assert!(!choice_pool_contains(&rulebook, &any, "Telepatía"));
        assert!(!choice_pool_contains(&rulebook, &any, "Cualquier habilidad"));
    }

    #[test]
    fn test_collect_allowed_for_private_investigator() {
        let rulebook = rulebook();
        let occupation = rulebook.occupation("Investigador privado").unwrap();
        let mut selection = OccupationSelection::new(occupation.name.clone(), 20);
        selection.set_choices(0, vec!["Persuasión".into()]);
        selection.set_choices(1, vec!["Combatir".into()]);

        let allowed = collect_allowed_occupation_skills(&rulebook, occupation, &selection);
        for skill in ["Psicología", "Persuasión", "Combatir (Pelea)", "Crédito"] {
            assert!(allowed.contains(&skill.to_string()), "missing {}", skill);
        }
        assert!(!allowed.contains(&"Encanto".to_string()));

        assert!(is_skill_allowed_for_occupation(
            &rulebook,
            occupation,
            &selection,
            "Combatir (Boxeo)"
        ));
        assert!(is_skill_allowed_for_occupation(&rulebook, occupation, &selection, "credito"));
        assert!(!is_skill_allowed_for_occupation(&rulebook, occupation, &selection, "Encanto"));
    }

    #[test]
    fn test_choices_of_another_occupation_ignored() {
        let rulebook = rulebook();
        let occupation = rulebook.occupation("Policía").unwrap();
        let mut selection = OccupationSelection::new(occupation.name.clone(), 20);
        selection
            .choices
            .insert(crate::occupation::ChoiceGroupRef::new("Atleta", 0), vec!["Encanto".into()]);

        assert!(!is_skill_allowed_for_occupation(&rulebook, occupation, &selection, "Encanto"));
    }
}
