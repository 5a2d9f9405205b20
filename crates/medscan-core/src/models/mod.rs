//! Domain models for the medscan system.

mod medicine;
mod resolution;

pub use medicine::*;
pub use resolution::*;
