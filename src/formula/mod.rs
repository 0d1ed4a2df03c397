//! Formula parsing and evaluation module
//!
//! Two grammars live here: dice formulas such as "3D6x5" or "(2D6+6)x5" used to
//! generate characteristics, and point-budget formulas such as
//! "EDU x 2 + (DES x 2 o FUE x 2)" used to size an occupation's skill budget.

mod ast;
pub mod cache;
mod dice;
mod evaluator;
pub mod parser;

#[cfg(test)]
mod property_tests;

pub use ast::*;
pub use cache::*;
pub use dice::*;
pub use evaluator::*;
pub use parser::*;
