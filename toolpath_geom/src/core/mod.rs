//! Shared math and traits: fuzzy float comparisons, 2D vectors, angle helpers and the
//! closed-form line/circle solvers the intersection engine is built on.
pub mod math;
pub mod traits;
