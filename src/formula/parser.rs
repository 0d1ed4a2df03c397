//! Point-budget formula parser
//!
//! The tokenizer is recursive: strip a fully wrapping pair of parentheses,
//! split on top-level `+`, then on top-level `O`, and finally read an atom.
//! Parsing never fails; anything unreadable becomes [`PointsNode::Unknown`]
//! and evaluates to 0. [`PointsFormula::validate`] is the strict check used
//! when loading rulebook content.

use crate::characteristics::Characteristic;
use crate::error::{Result, RulesError};
use crate::formula::ast::{ChoiceNode, PointsFormula, PointsNode};
use once_cell::sync::Lazy;
use regex::Regex;

/// `<CHAR>x<digits>`
static SCALED_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)[xX×*](\d+)$").expect("valid scaled token regex"));

/// Parse a point-budget formula into an AST
pub fn parse(formula: &str) -> PointsFormula {
    let source: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
    let chars: Vec<char> = source.chars().collect();
    let mut next_group = 0;
    let root = parse_token(&chars, &mut next_group);

    PointsFormula {
        source,
        root,
        group_count: next_group,
    }
}

fn parse_token(token: &[char], next_group: &mut usize) -> PointsNode {
    let token = strip_outer_parens(token);

    // `+` has the highest split priority
    let terms = split_top_level(token, |t, i| t[i] == '+');
    if terms.len() > 1 {
        return PointsNode::Sum(
            terms
                .into_iter()
                .map(|term| parse_token(term, next_group))
                .collect(),
        );
    }

    let options = split_top_level(token, is_choice_separator);
    if options.len() > 1 {
        // Groups are numbered in parse order: the outer split claims its index
        // before its branches are parsed
        let index = *next_group;
        *next_group += 1;
        let literals = options.iter().map(|o| o.iter().collect()).collect();
        let branches = options
            .into_iter()
            .map(|option| parse_token(option, next_group))
            .collect();
        return PointsNode::Choice(ChoiceNode {
            index,
            options: literals,
            branches,
        });
    }

    parse_atom(&token.iter().collect::<String>())
}

/// Strip parentheses only while a single pair wraps the whole token
fn strip_outer_parens(mut token: &[char]) -> &[char] {
    while token.len() >= 2
        && token[0] == '('
        && token[token.len() - 1] == ')'
        && wraps_entirely(token)
    {
        token = &token[1..token.len() - 1];
    }
    token
}

fn wraps_entirely(token: &[char]) -> bool {
    let last = token.len() - 1;
    let mut depth = 0i32;
    for (i, &c) in token.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != last {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Split at every depth-0 position accepted by `is_separator`
fn split_top_level<F>(token: &[char], is_separator: F) -> Vec<&[char]>
where
    F: Fn(&[char], usize) -> bool,
{
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for i in 0..token.len() {
        match token[i] {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && is_separator(token, i) => {
                parts.push(&token[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&token[start..]);
    parts
}

/// `O` separates alternatives only at a token boundary: digit or `)` before
/// and letter or `(` after, or letter before and `(` after. This keeps the
/// `O` inside "POD" or "CON" from splitting the characteristic name.
pub(crate) fn is_choice_separator(token: &[char], i: usize) -> bool {
    if !matches!(token[i], 'O' | 'o') || i == 0 || i + 1 >= token.len() {
        return false;
    }
    let prev = token[i - 1];
    let next = token[i + 1];

    ((prev.is_ascii_digit() || prev == ')') && (next.is_alphabetic() || next == '('))
        || (prev.is_alphabetic() && next == '(')
}

fn parse_atom(text: &str) -> PointsNode {
    if let Some(caps) = SCALED_TOKEN.captures(text) {
        let characteristic = Characteristic::from_str(&caps[1]);
        let multiplier = caps[2].parse::<i32>().ok();
        return match (characteristic, multiplier) {
            (Some(characteristic), Some(multiplier)) => PointsNode::Scaled {
                characteristic,
                multiplier,
            },
            _ => PointsNode::Unknown(text.to_string()),
        };
    }

    if !text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic()) {
        return Characteristic::from_str(text)
            .map(PointsNode::Characteristic)
            .unwrap_or_else(|| PointsNode::Unknown(text.to_string()));
    }

    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(value) = text.parse::<i32>() {
            return PointsNode::Constant(value);
        }
    }

    PointsNode::Unknown(text.to_string())
}

impl PointsFormula {
    /// Strict check: balanced parentheses and no unrecognized tokens
    pub fn validate(&self) -> Result<()> {
        if self.source.is_empty() {
            return Err(RulesError::InvalidFormula("Empty formula".to_string()));
        }

        let mut depth = 0i32;
        for c in self.source.chars() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                break;
            }
        }
        if depth != 0 {
            return Err(RulesError::InvalidFormula(format!(
                "Unbalanced parentheses in {}",
                self.source
            )));
        }

        if let Some(token) = first_unknown(&self.root) {
            return Err(RulesError::InvalidFormula(format!(
                "Unrecognized token '{}' in {}",
                token, self.source
            )));
        }

        Ok(())
    }
}

fn first_unknown(node: &PointsNode) -> Option<&str> {
    match node {
        PointsNode::Unknown(token) => Some(token),
        PointsNode::Sum(terms) => terms.iter().find_map(first_unknown),
        PointsNode::Choice(choice) => choice.branches.iter().find_map(first_unknown),
        _ => None,
    }
}
