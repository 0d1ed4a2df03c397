//! Age modifiers
//!
//! Young investigators lose EDU and split a fixed penalty between FUE and TAM,
//! but roll SUERTE twice. From 40 on, a per-decade penalty is split among FUE,
//! CON and DES and APA drops by a fixed amount. Adults get EDU improvement
//! checks. Every adjustment is recorded as an [`AuditStep`].

use crate::characteristics::state::{
    Characteristic, Characteristics, CHARACTERISTIC_MAX, CHARACTERISTIC_MIN,
};
use crate::config::Rulebook;
use crate::formula::{DiceFormula, DiceRoll};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Youngest age the rulebook covers
pub const MIN_AGE: u32 = 15;
/// Oldest age the rulebook covers
pub const MAX_AGE: u32 = 89;
/// FUE + TAM penalty for ages 15-19
pub const YOUTH_PENALTY_TOTAL: i32 = 5;
/// EDU penalty for ages 15-19
pub const YOUTH_EDU_PENALTY: i32 = 5;

const PERCENTILE: DiceFormula = DiceFormula {
    count: 1,
    sides: 100,
    modifier: 0,
    multiplier: 1,
};

const EDU_GAIN: DiceFormula = DiceFormula {
    count: 1,
    sides: 10,
    modifier: 0,
    multiplier: 1,
};

/// Operator-chosen penalty split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgePenaltyAllocation {
    #[serde(default)]
    pub youth_fue: u32,
    #[serde(default)]
    pub youth_tam: u32,
    #[serde(default)]
    pub mature_fue: u32,
    #[serde(default)]
    pub mature_con: u32,
    #[serde(default)]
    pub mature_des: u32,
}

impl AgePenaltyAllocation {
    /// The even split the engine falls back to for `age`
    pub fn suggested(age: u32) -> Self {
        let mut allocation = Self::default();
        if is_youth(age) {
            let (fue, tam) = default_youth_split();
            allocation.youth_fue = fue as u32;
            allocation.youth_tam = tam as u32;
        }
        let target = mature_penalty_target(age);
        if target > 0 {
            let (fue, con, des) = default_mature_split(target);
            allocation.mature_fue = fue as u32;
            allocation.mature_con = con as u32;
            allocation.mature_des = des as u32;
        }
        allocation
    }

    #[inline]
    pub fn youth_sum(&self) -> i32 {
        (self.youth_fue + self.youth_tam) as i32
    }

    #[inline]
    pub fn mature_sum(&self) -> i32 {
        (self.mature_fue + self.mature_con + self.mature_des) as i32
    }
}

/// Allocation that does not add up to the rulebook target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationMismatch {
    pub youth: bool,
    pub expected: i32,
    pub actual: i32,
}

#[inline]
pub fn is_youth(age: u32) -> bool {
    (15..=19).contains(&age)
}

/// Total FUE/CON/DES penalty for the age's decade
pub fn mature_penalty_target(age: u32) -> i32 {
    match age {
        0..=39 => 0,
        40..=49 => 5,
        50..=59 => 10,
        60..=69 => 20,
        70..=79 => 40,
        _ => 80,
    }
}

/// Fixed APA penalty for the age's decade
pub fn appearance_penalty(age: u32) -> i32 {
    match age {
        0..=39 => 0,
        40..=49 => 5,
        50..=59 => 10,
        60..=69 => 15,
        70..=79 => 20,
        _ => 25,
    }
}

/// Number of EDU improvement checks
pub fn edu_improvement_rolls(age: u32) -> u32 {
    match age {
        0..=19 => 0,
        20..=39 => 1,
        40..=49 => 2,
        50..=59 => 3,
        _ => 4,
    }
}

fn default_youth_split() -> (i32, i32) {
    let fue = YOUTH_PENALTY_TOTAL / 2;
    (fue, YOUTH_PENALTY_TOTAL - fue)
}

fn default_mature_split(target: i32) -> (i32, i32, i32) {
    let share = target / 3;
    (share, share, target - 2 * share)
}

/// Check the allocation that applies to `age`, if any
pub fn allocation_mismatch(
    age: u32,
    allocation: &AgePenaltyAllocation,
) -> Option<AllocationMismatch> {
    if is_youth(age) && allocation.youth_sum() != YOUTH_PENALTY_TOTAL {
        return Some(AllocationMismatch {
            youth: true,
            expected: YOUTH_PENALTY_TOTAL,
            actual: allocation.youth_sum(),
        });
    }
    let target = mature_penalty_target(age);
    if target > 0 && allocation.mature_sum() != target {
        return Some(AllocationMismatch {
            youth: false,
            expected: target,
            actual: allocation.mature_sum(),
        });
    }
    None
}

/// Penalties and rolls resolved for one age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AgePenalties {
    pub fue: i32,
    pub con: i32,
    pub tam: i32,
    pub des: i32,
    pub apa: i32,
    pub edu: i32,
    /// SUERTE rolls, the highest is kept
    pub luck_rolls: u32,
    pub edu_improvement_rolls: u32,
    /// The operator's split was rejected and the even split used instead
    pub default_split: bool,
}

impl AgePenalties {
    #[inline]
    pub fn for_characteristic(&self, characteristic: Characteristic) -> i32 {
        match characteristic {
            Characteristic::Fue => self.fue,
            Characteristic::Con => self.con,
            Characteristic::Tam => self.tam,
            Characteristic::Des => self.des,
            Characteristic::Apa => self.apa,
            Characteristic::Edu => self.edu,
            _ => 0,
        }
    }
}

/// Resolve the penalties for an age and allocation
pub fn age_penalties(age: u32, allocation: &AgePenaltyAllocation) -> AgePenalties {
    let mut penalties = AgePenalties {
        luck_rolls: 1,
        edu_improvement_rolls: edu_improvement_rolls(age),
        ..Default::default()
    };

    if is_youth(age) {
        penalties.edu = YOUTH_EDU_PENALTY;
        penalties.luck_rolls = 2;
        if allocation.youth_sum() == YOUTH_PENALTY_TOTAL {
            penalties.fue = allocation.youth_fue as i32;
            penalties.tam = allocation.youth_tam as i32;
        } else {
            let (fue, tam) = default_youth_split();
            penalties.fue = fue;
            penalties.tam = tam;
            penalties.default_split = true;
        }
    }

    let target = mature_penalty_target(age);
    if target > 0 {
        if allocation.mature_sum() == target {
            penalties.fue = allocation.mature_fue as i32;
            penalties.con = allocation.mature_con as i32;
            penalties.des = allocation.mature_des as i32;
        } else {
            let (fue, con, des) = default_mature_split(target);
            penalties.fue = fue;
            penalties.con = con;
            penalties.des = des;
            penalties.default_split = true;
        }
        penalties.apa = appearance_penalty(age);
    }

    penalties
}

/// One human-readable adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditStep {
    pub characteristic: Characteristic,
    pub description: String,
    pub before: i32,
    pub after: i32,
    pub dice: Vec<DiceRoll>,
}

/// One EDU improvement check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EduImprovement {
    pub iteration: u32,
    pub edu_before: i32,
    pub check: DiceRoll,
    pub improved: bool,
    pub gain: Option<DiceRoll>,
    pub edu_after: i32,
}

/// A single characteristic rolled and aged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacteristicRoll {
    pub characteristic: Characteristic,
    pub roll: DiceRoll,
    pub final_value: i32,
    pub steps: Vec<AuditStep>,
    pub edu_improvements: Vec<EduImprovement>,
}

/// A full characteristic block after age modifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgedCharacteristics {
    pub characteristics: Characteristics,
    pub penalties: AgePenalties,
    pub steps: Vec<AuditStep>,
    pub edu_improvements: Vec<EduImprovement>,
}

/// Apply every age modifier to an already rolled block
pub fn apply_age_modifiers<R: Rng + ?Sized>(
    rulebook: &Rulebook,
    base: &Characteristics,
    age: u32,
    allocation: &AgePenaltyAllocation,
    rng: &mut R,
) -> AgedCharacteristics {
    let penalties = age_penalties(age, allocation);
    let mut characteristics = *base;
    let mut steps = Vec::new();
    let mut edu_improvements = Vec::new();

    for key in Characteristic::ALL {
        let value = apply_to_characteristic(
            rulebook,
            key,
            base.get(key),
            age,
            &penalties,
            rng,
            &mut steps,
            &mut edu_improvements,
        );
        characteristics.set(key, value);
    }

    tracing::debug!(age, steps = steps.len(), "age modifiers applied");

    AgedCharacteristics {
        characteristics,
        penalties,
        steps,
        edu_improvements,
    }
}

/// Roll one characteristic and apply the age modifiers that touch it
pub fn roll_characteristic_with_age_modifiers<R: Rng + ?Sized>(
    rulebook: &Rulebook,
    characteristic: Characteristic,
    age: u32,
    allocation: &AgePenaltyAllocation,
    rng: &mut R,
) -> CharacteristicRoll {
    let penalties = age_penalties(age, allocation);
    let roll = rulebook.generation_formula(characteristic).roll(rng);
    let mut steps = vec![AuditStep {
        characteristic,
        description: format!("{} rolled {} = {}", characteristic, roll.formula, roll.total),
        before: 0,
        after: roll.total,
        dice: vec![roll.clone()],
    }];
    let mut edu_improvements = Vec::new();

    let final_value = apply_to_characteristic(
        rulebook,
        characteristic,
        roll.total,
        age,
        &penalties,
        rng,
        &mut steps,
        &mut edu_improvements,
    );

    CharacteristicRoll {
        characteristic,
        roll,
        final_value,
        steps,
        edu_improvements,
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_to_characteristic<R: Rng + ?Sized>(
    rulebook: &Rulebook,
    key: Characteristic,
    mut value: i32,
    age: u32,
    penalties: &AgePenalties,
    rng: &mut R,
    steps: &mut Vec<AuditStep>,
    edu_improvements: &mut Vec<EduImprovement>,
) -> i32 {
    let amount = penalties.for_characteristic(key);
    if amount > 0 {
        let after = (value - amount).max(CHARACTERISTIC_MIN);
        let mut description = format!("Age {}: {} -{}", age, key, amount);
        if penalties.default_split && key != Characteristic::Apa && key != Characteristic::Edu {
            description.push_str(" (allocation does not match the target, even split used)");
        }
        if after != value - amount {
            description.push_str(&format!(", floored at {}", CHARACTERISTIC_MIN));
        }
        steps.push(AuditStep {
            characteristic: key,
            description,
            before: value,
            after,
            dice: Vec::new(),
        });
        value = after;
    }

    if key == Characteristic::Suerte {
        for _ in 1..penalties.luck_rolls {
            let reroll = rulebook.generation_formula(key).roll(rng);
            let kept = value.max(reroll.total);
            steps.push(AuditStep {
                characteristic: key,
                description: format!(
                    "Age {}: SUERTE rolled twice ({} and {}), keeping {}",
                    age, value, reroll.total, kept
                ),
                before: value,
                after: kept,
                dice: vec![reroll],
            });
            value = kept;
        }
    }

    if key == Characteristic::Edu {
        for iteration in 1..=penalties.edu_improvement_rolls {
            let improvement = improve_edu(iteration, value, rng);
            let description = match &improvement.gain {
                Some(gain) => format!(
                    "EDU improvement check {}: rolled {} over {}, +{}",
                    iteration, improvement.check.total, improvement.edu_before, gain.total
                ),
                None => format!(
                    "EDU improvement check {}: rolled {}, no improvement over {}",
                    iteration, improvement.check.total, improvement.edu_before
                ),
            };
            let mut dice = vec![improvement.check.clone()];
            dice.extend(improvement.gain.clone());
            steps.push(AuditStep {
                characteristic: key,
                description,
                before: improvement.edu_before,
                after: improvement.edu_after,
                dice,
            });
            value = improvement.edu_after;
            edu_improvements.push(improvement);
        }
    }

    value
}

/// 1D100 over current EDU grants 1D10, capped at 99
fn improve_edu<R: Rng + ?Sized>(iteration: u32, edu: i32, rng: &mut R) -> EduImprovement {
    let check = PERCENTILE.roll(rng);
    let (gain, edu_after) = if check.total > edu {
        let gain = EDU_GAIN.roll(rng);
        let after = (edu + gain.total).min(CHARACTERISTIC_MAX);
        (Some(gain), after)
    } else {
        (None, edu)
    };

    EduImprovement {
        iteration,
        edu_before: edu,
        improved: gain.is_some(),
        check,
        gain,
        edu_after,
    }
}
