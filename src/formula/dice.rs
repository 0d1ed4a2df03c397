//! Dice formulas: `NDS`, `(NDS+K)`, optionally followed by `xM`

use crate::error::{Result, RulesError};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Upper bound on dice per formula
pub const MAX_DICE: u32 = 100;
/// Upper bound on die sides, modifier and multiplier. Keeps every total
/// well inside `i32`.
pub const MAX_SIDES: u32 = 1000;
pub const MAX_MODIFIER: u32 = 1000;
pub const MAX_MULTIPLIER: u32 = 100;

static DICE_FORMULA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+)[dD](\d+)|\((\d+)[dD](\d+)\+(\d+)\))(?:[xX×*](\d+))?$")
        .expect("valid dice regex")
});

/// Parsed dice formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceFormula {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
    pub multiplier: i32,
}

/// Result of rolling a dice formula, with the full breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    pub formula: String,
    /// Individual die values, each in `1..=sides`
    pub dice: SmallVec<[u32; 4]>,
    pub modifier: i32,
    /// Sum of dice plus modifier, before the multiplier
    pub subtotal: i32,
    pub multiplier: i32,
    pub total: i32,
}

impl DiceFormula {
    /// Parse a dice formula; whitespace is ignored
    pub fn parse(formula: &str) -> Result<Self> {
        let compact: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
        let caps = DICE_FORMULA.captures(&compact).ok_or_else(|| {
            RulesError::InvalidFormula(format!("Unsupported dice formula: {}", formula))
        })?;

        let number = |i: usize| -> Result<Option<u32>> {
            caps.get(i)
                .map(|m| {
                    m.as_str().parse::<u32>().map_err(|_| {
                        RulesError::InvalidFormula(format!("Number out of range in {}", formula))
                    })
                })
                .transpose()
        };

        let (count, sides, modifier) = match (number(1)?, number(2)?) {
            (Some(count), Some(sides)) => (count, sides, 0),
            _ => (
                number(3)?.unwrap_or(0),
                number(4)?.unwrap_or(0),
                number(5)?.unwrap_or(0),
            ),
        };
        let multiplier = number(6)?.unwrap_or(1);

        if count == 0 || count > MAX_DICE || sides == 0 || multiplier == 0 {
            return Err(RulesError::InvalidFormula(format!(
                "Dice count, sides and multiplier must be positive in {}",
                formula
            )));
        }
        if sides > MAX_SIDES || modifier > MAX_MODIFIER || multiplier > MAX_MULTIPLIER {
            return Err(RulesError::InvalidFormula(format!(
                "Dice sides, modifier or multiplier out of range in {}",
                formula
            )));
        }

        Ok(Self {
            count,
            sides,
            modifier: modifier as i32,
            multiplier: multiplier as i32,
        })
    }

    /// Roll every die before computing the total
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        let dice: SmallVec<[u32; 4]> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();
        let sum: i32 = dice.iter().map(|&d| d as i32).sum();
        let subtotal = sum + self.modifier;

        DiceRoll {
            formula: self.to_string(),
            dice,
            modifier: self.modifier,
            subtotal,
            multiplier: self.multiplier,
            total: subtotal.saturating_mul(self.multiplier),
        }
    }

    /// Smallest possible total
    pub fn min_total(&self) -> i32 {
        (self.count as i32 + self.modifier) * self.multiplier
    }

    /// Largest possible total
    pub fn max_total(&self) -> i32 {
        (self.count as i32 * self.sides as i32 + self.modifier) * self.multiplier
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifier != 0 {
            write!(f, "({}D{}+{})", self.count, self.sides, self.modifier)?;
        } else {
            write!(f, "{}D{}", self.count, self.sides)?;
        }
        if self.multiplier != 1 {
            write!(f, "x{}", self.multiplier)?;
        }
        Ok(())
    }
}

/// Parse and roll in one step
pub fn roll_dice<R: Rng + ?Sized>(formula: &str, rng: &mut R) -> Result<DiceRoll> {
    Ok(DiceFormula::parse(formula)?.roll(rng))
}
