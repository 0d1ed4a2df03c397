//! Derived statistics

use crate::characteristics::state::{Characteristic, Characteristics};
use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics computed from a complete characteristic block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedStats {
    /// Hit points
    pub pv: i32,
    /// Magic points
    pub pm: i32,
    /// Starting sanity
    pub cordura: i32,
    /// Movement rate
    pub mov: i32,
    /// Corpulence
    pub build: i32,
    pub damage_bonus: String,
    /// Half value per characteristic
    pub hard: BTreeMap<Characteristic, i32>,
    /// Fifth value per characteristic
    pub extreme: BTreeMap<Characteristic, i32>,
}

pub fn compute_derived_stats(characteristics: &Characteristics, age: u32) -> DerivedStats {
    let (build, damage_bonus) = build_and_damage_bonus(characteristics.fue + characteristics.tam);

    let mut hard = BTreeMap::new();
    let mut extreme = BTreeMap::new();
    for key in Characteristic::ALL {
        let value = characteristics.get(key);
        hard.insert(key, value / 2);
        extreme.insert(key, value / 5);
    }

    DerivedStats {
        pv: (characteristics.con + characteristics.tam) / 10,
        pm: characteristics.pod / 5,
        cordura: characteristics.pod,
        mov: movement_rate(characteristics, age),
        build,
        damage_bonus,
        hard,
        extreme,
    }
}

/// Base 7, 8 or 9 from DES and FUE against TAM, minus one per decade from 40
pub fn movement_rate(characteristics: &Characteristics, age: u32) -> i32 {
    let Characteristics { fue, des, tam, .. } = *characteristics;
    let base = if des < tam && fue < tam {
        7
    } else if des > tam && fue > tam {
        9
    } else {
        8
    };

    let decade_penalty = match age {
        0..=39 => 0,
        40..=49 => 1,
        50..=59 => 2,
        60..=69 => 3,
        70..=79 => 4,
        _ => 5,
    };
    base - decade_penalty
}

/// Build and damage bonus for FUE + TAM
pub fn build_and_damage_bonus(fue_plus_tam: i32) -> (i32, String) {
    match fue_plus_tam {
        i32::MIN..=64 => (-2, "-2".to_string()),
        65..=84 => (-1, "-1".to_string()),
        85..=124 => (0, "0".to_string()),
        125..=164 => (1, "+1D4".to_string()),
        165..=204 => (2, "+1D6".to_string()),
        _ => {
            let extra = (fue_plus_tam - 205) / 80;
            (3 + extra, format!("+{}D6", 2 + extra))
        }
    }
}
