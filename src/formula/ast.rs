//! Abstract Syntax Tree for point-budget formulas

use crate::characteristics::Characteristic;
use serde::Serialize;
use std::collections::BTreeMap;

/// Branch selections keyed by choice group index
pub type FormulaChoices = BTreeMap<usize, String>;

/// Parsed point-budget formula
#[derive(Debug, Clone, PartialEq)]
pub struct PointsFormula {
    /// Formula text with whitespace stripped
    pub source: String,
    pub root: PointsNode,
    /// Number of choice groups, indices are `0..group_count`
    pub group_count: usize,
}

/// AST node for point-budget formulas
#[derive(Debug, Clone, PartialEq)]
pub enum PointsNode {
    /// Top-level `+` split
    Sum(Vec<PointsNode>),
    /// Top-level `O` split: the operator picks one branch
    Choice(ChoiceNode),
    /// `EDUx20`
    Scaled {
        characteristic: Characteristic,
        multiplier: i32,
    },
    /// Bare characteristic
    Characteristic(Characteristic),
    /// Integer literal
    Constant(i32),
    /// Anything else; evaluates to 0
    Unknown(String),
}

/// "A o B" alternative
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceNode {
    pub index: usize,
    /// Literal option text, whitespace stripped
    pub options: Vec<String>,
    pub branches: Vec<PointsNode>,
}

/// Choice group as exposed to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaChoiceGroup {
    pub key: usize,
    pub options: Vec<String>,
}
