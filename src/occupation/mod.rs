//! Occupation resolution: the operator's selection, how catalog grants
//! expand into concrete skills, and the point budgets an occupation gives.

mod budget;
mod choice_map;
mod resolver;
mod selection;


pub use budget::*;
pub use resolver::*;
pub use selection::*;
