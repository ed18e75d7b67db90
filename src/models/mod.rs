//! The fixed model catalog: cubic, quartic, exponential, logarithmic, power.
//!
//! Models are implemented as small, pure functions on an enum so that the
//! solver and the selection code can stay generic.

pub mod model;

pub use model::*;
