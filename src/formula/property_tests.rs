//! Property tests for formula module
//!
//! Dice totals stay within the formula's range, point formulas are linear in
//! the characteristics, and pick-highest never loses to an explicit choice.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::characteristics::{Characteristic, Characteristics};
use crate::formula::dice::DiceFormula;
use crate::formula::evaluator::{choice_groups, evaluate, pick_highest};
use crate::formula::parser::parse;
use crate::formula::FormulaChoices;

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators for property tests
// ═══════════════════════════════════════════════════════════════════════════

fn characteristic_strategy() -> impl Strategy<Value = Characteristic> {
    prop::sample::select(Characteristic::ALL.to_vec())
}

fn characteristics_strategy() -> impl Strategy<Value = Characteristics> {
    prop::collection::vec(1..=99i32, 9).prop_map(|values| {
        let mut chars = Characteristics::default();
        for (key, value) in Characteristic::ALL.iter().zip(values) {
            chars.set(*key, value);
        }
        chars
    })
}

/// "(NDS+K)xM" or "NDSxM"
fn dice_formula_strategy() -> impl Strategy<Value = (String, u32, u32, u32, u32)> {
    (1..=10u32, 1..=20u32, 0..=10u32, 1..=10u32).prop_map(|(count, sides, modifier, mult)| {
        let text = if modifier == 0 {
            format!("{}D{}x{}", count, sides, mult)
        } else {
            format!("({}D{}+{})x{}", count, sides, modifier, mult)
        };
        (text, count, sides, modifier, mult)
    })
}

/// "A o B o ..." over scaled characteristic tokens
fn choice_formula_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((characteristic_strategy(), 1..=4i32), 2..=4).prop_map(|options| {
        let options: Vec<String> = options
            .into_iter()
            .map(|(c, m)| format!("{} x {}", c, m))
            .collect();
        format!("EDU x 2 + ({})", options.join(" o "))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Every roll equals (sum of dice + modifier) x multiplier and stays in range
    #[test]
    fn prop_dice_total_within_range(
        (text, count, sides, modifier, mult) in dice_formula_strategy(),
        seed in any::<u64>(),
    ) {
        let formula = DiceFormula::parse(&text).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let roll = formula.roll(&mut rng);

        prop_assert_eq!(roll.dice.len(), count as usize);
        prop_assert!(roll.dice.iter().all(|&d| d >= 1 && d <= sides));
        let sum: u32 = roll.dice.iter().sum();
        prop_assert_eq!(roll.subtotal, (sum + modifier) as i32);
        prop_assert_eq!(roll.total, roll.subtotal * mult as i32);
        prop_assert!(roll.total >= formula.min_total() && roll.total <= formula.max_total());
    }

    /// "<CHAR> x <M>" evaluates to value * M
    #[test]
    fn prop_scaled_token(
        chars in characteristics_strategy(),
        key in characteristic_strategy(),
        multiplier in 1..=9i32,
    ) {
        let formula = parse(&format!("{} x {}", key, multiplier));
        prop_assert!(formula.validate().is_ok());
        prop_assert_eq!(
            evaluate(&formula, &chars, &FormulaChoices::new()),
            chars.get(key) * multiplier
        );
    }

    /// "(A+B)" evaluates to the sum of both characteristics
    #[test]
    fn prop_sum_of_characteristics(
        chars in characteristics_strategy(),
        a in characteristic_strategy(),
        b in characteristic_strategy(),
    ) {
        let formula = parse(&format!("({}+{})", a, b));
        prop_assert_eq!(
            evaluate(&formula, &chars, &FormulaChoices::new()),
            chars.get(a) + chars.get(b)
        );
    }

    /// Pick-highest is at least as good as every explicit choice
    #[test]
    fn prop_pick_highest_dominates(
        chars in characteristics_strategy(),
        text in choice_formula_strategy(),
    ) {
        let formula = parse(&text);
        let best = pick_highest(&formula, &chars);
        let groups = choice_groups(&formula);
        prop_assert_eq!(groups.len(), 1);
        prop_assert_eq!(best.choices.len(), 1);
        prop_assert_eq!(evaluate(&formula, &chars, &best.choices), best.total);

        for option in &groups[0].options {
            let mut choices = FormulaChoices::new();
            choices.insert(0, option.clone());
            prop_assert!(evaluate(&formula, &chars, &choices) <= best.total);
        }
    }

    /// Parsing arbitrary text never panics and whitespace is irrelevant
    #[test]
    fn prop_parse_total(text in "[A-Za-z0-9()+ x]{0,24}") {
        let spaced = parse(&text);
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(spaced, parse(&compact));
    }
}
