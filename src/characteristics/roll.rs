//! Characteristic generation

use crate::characteristics::state::{Characteristic, Characteristics};
use crate::config::Rulebook;
use crate::formula::DiceRoll;
use rand::Rng;
use std::collections::BTreeMap;

/// Roll every characteristic once with the rulebook's generation formulas
pub fn roll_characteristics<R: Rng + ?Sized>(rulebook: &Rulebook, rng: &mut R) -> Characteristics {
    let mut characteristics = Characteristics::default();
    for (key, roll) in roll_characteristics_detailed(rulebook, rng) {
        characteristics.set(key, roll.total);
    }
    characteristics
}

/// Same as [`roll_characteristics`] but keeps every dice breakdown
pub fn roll_characteristics_detailed<R: Rng + ?Sized>(
    rulebook: &Rulebook,
    rng: &mut R,
) -> BTreeMap<Characteristic, DiceRoll> {
    Characteristic::ALL
        .iter()
        .map(|&key| (key, rulebook.generation_formula(key).roll(rng)))
        .collect()
}
