//! Serialize choice maps as a list of `{group, skills}` pairs; JSON objects
//! only take string keys.

use crate::occupation::selection::ChoiceGroupRef;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Serialize)]
struct EntryRef<'a> {
    group: &'a ChoiceGroupRef,
    skills: &'a [String],
}

#[derive(Deserialize)]
struct Entry {
    group: ChoiceGroupRef,
    #[serde(default)]
    skills: Vec<String>,
}

pub fn serialize<S>(
    value: &BTreeMap<ChoiceGroupRef, Vec<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(
        value
            .iter()
            .map(|(group, skills)| EntryRef { group, skills }),
    )
}

pub fn deserialize<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<ChoiceGroupRef, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Entry>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|entry| (entry.group, entry.skills))
        .collect())
}
