//! Chains: ordered groups of connected shapes forming one cut path.
//!
//! [detect_chains] groups raw shapes by end point proximity, [normalize_chain] orders and orients
//! the shapes of one chain into a single traversal and [analyze_chain_traversal] reports where a
//! chain cannot be traversed in its current order.

mod detect;
mod normalize;
mod traversal;
mod union_find;

pub use detect::detect_chains;
pub use normalize::{normalize_chain, normalize_chains, NormalizeOptions};
pub use traversal::{
    analyze_chain_traversal, analyze_traversal, TraversalAnalysis, TraversalIssue,
    TraversalIssueKind,
};

use std::fmt;

use static_aabb2d_index::AABB;

use crate::{
    core::{math::Vector2, traits::Real},
    shape::{extents, Shape, ShapeId},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a chain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub String);

impl ChainId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        ChainId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        ChainId::new(value)
    }
}

/// Ordered sequence of shapes.
///
/// Shapes keep the [ShapeId] of the drawing shape they came from, normalization may replace a
/// shape by its reversed copy (same id).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Chain<T = f64> {
    pub id: ChainId,
    pub shapes: Vec<Shape<T>>,
}

impl<T> Chain<T>
where
    T: Real,
{
    pub fn new(id: impl Into<ChainId>, shapes: Vec<Shape<T>>) -> Self {
        Chain {
            id: id.into(),
            shapes,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Start point of the first shape.
    #[inline]
    pub fn start_point(&self) -> Option<Vector2<T>> {
        self.shapes.first().map(|s| s.start_point())
    }

    /// End point of the last shape.
    #[inline]
    pub fn end_point(&self) -> Option<Vector2<T>> {
        self.shapes.last().map(|s| s.end_point())
    }

    /// Returns true if the chain end point is within `tolerance` of its start point. Empty chains
    /// are not closed.
    pub fn is_closed(&self, tolerance: T) -> bool {
        match (self.start_point(), self.end_point()) {
            (Some(s), Some(e)) => (e - s).length() < tolerance,
            _ => false,
        }
    }

    pub fn length(&self) -> T {
        self.shapes.iter().fold(T::zero(), |acc, s| acc + s.length())
    }

    /// Union of the shape extents, `None` for an empty chain.
    pub fn bounding_box(&self) -> Option<AABB<T>> {
        let mut iter = self.shapes.iter();
        let first = iter.next()?.bounding_box();
        Some(iter.fold(first, |acc, s| extents::union(&acc, &s.bounding_box())))
    }

    pub fn shape_ids(&self) -> impl Iterator<Item = &ShapeId> + '_ {
        self.shapes.iter().map(|s| &s.id)
    }

    /// Returns true if each shape ends where the next starts (within `tolerance`).
    pub fn is_connected_in_order(&self, tolerance: T) -> bool {
        self.shapes
            .windows(2)
            .all(|w| (w[1].start_point() - w[0].end_point()).length() < tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Chain {
        let p = [
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(4.0, 4.0),
            Vector2::new(0.0, 4.0),
        ];
        let shapes = (0..4)
            .map(|i| Shape::line(format!("s{i}"), p[i], p[(i + 1) % 4]))
            .collect();
        Chain::new("sq", shapes)
    }

    #[test]
    fn closed_square() {
        let c = square();
        assert!(c.is_closed(1e-6));
        assert!(c.is_connected_in_order(1e-6));
        assert_fuzzy_eq!(c.length(), 16.0);
        let bb = c.bounding_box().unwrap();
        assert_fuzzy_eq!(bb.max_x, 4.0);
        assert_fuzzy_eq!(bb.max_y, 4.0);
        let ids: Vec<_> = c.shape_ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["s0", "s1", "s2", "s3"]);
    }

    #[test]
    fn empty_chain() {
        let c: Chain = Chain::new("e", Vec::new());
        assert!(!c.is_closed(1.0));
        assert!(c.bounding_box().is_none());
        assert!(c.is_connected_in_order(1.0));
    }
}
