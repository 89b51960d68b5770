//! Error types for the toolpath geometry engine.
//!
//! Only numeric curve solving can fail hard. Degenerate geometry falls back to fixed values and
//! structural problems in chains or parts are reported as warnings in result structs.

use thiserror::Error;

use crate::shape::ShapeId;

/// Errors describing why a spline definition cannot be evaluated as a NURBS curve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    /// Fewer than two control points.
    #[error("spline requires at least 2 control points, got {count}")]
    TooFewControlPoints { count: usize },

    /// Degree is zero or not less than the control point count.
    #[error("spline degree {degree} is invalid for {control_points} control points")]
    InvalidDegree { degree: usize, control_points: usize },

    /// Knot vector length does not equal `control_points + degree + 1`.
    #[error("spline knot count must be {expected}, got {actual}")]
    KnotCountMismatch { expected: usize, actual: usize },

    /// Knot values decrease somewhere in the vector or the domain is empty.
    #[error("spline knots must be non-decreasing with a non-empty domain")]
    InvalidKnots,

    /// Weight count does not match control points or a weight is not finite and positive.
    #[error("spline weights must be finite, positive and match the control point count")]
    InvalidWeights,

    /// A control point or knot is NaN or infinite.
    #[error("spline contains non-finite values")]
    NonFinite,
}

/// Errors from the intersection engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntersectError {
    /// A spline participating in the pair cannot be built into a NURBS curve.
    #[error("invalid spline '{shape_id}': {source}")]
    InvalidSpline {
        shape_id: ShapeId,
        #[source]
        source: SplineError,
    },

    /// The numeric curve-curve solver produced non-finite values.
    #[error("curve intersection solver failed for '{shape_id_a}' and '{shape_id_b}': {reason}")]
    SolverFailure {
        shape_id_a: ShapeId,
        shape_id_b: ShapeId,
        reason: String,
    },
}
