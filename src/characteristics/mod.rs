//! Characteristics: the nine core attributes, how they are rolled, how age
//! modifies them and which statistics derive from them.

mod age;
mod derived;
mod roll;
mod state;


pub use age::*;
pub use derived::*;
pub use roll::*;
pub use state::*;
