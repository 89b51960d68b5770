//! Geometry preparation for 2D cutting toolpaths.
//!
//! Shapes read from a drawing go through four stages:
//!
//! 1. [intersect] finds where shapes cross or touch.
//! 2. [chain::detect_chains] groups shapes whose end points connect.
//! 3. [chain::normalize_chain] orders each chain into a continuous path.
//! 4. [part::detect_parts] nests closed chains into parts with holes.
//!
//! All geometry is generic over [core::traits::Real] with `f64` as the default.

extern crate static_aabb2d_index;

#[macro_use]
mod macros;

pub mod chain;
pub mod core;
pub mod error;
pub mod intersect;
pub mod part;
pub mod shape;

pub use static_aabb2d_index::AABB;

pub use crate::error::{IntersectError, SplineError};
pub use crate::shape::{Geometry, Shape, ShapeId, ShapeKind};
