//! Drawing primitives and the point queries every other module builds on.
//!
//! All queries are total: degenerate geometry (zero radius, empty polylines, splines that cannot
//! be evaluated) produces finite fallback values instead of panicking.

mod arc;
mod ellipse;
pub(crate) mod extents;
mod line;
mod polyline;
mod spline;

use std::fmt;

use static_aabb2d_index::AABB;

pub use arc::{Arc, Circle};
pub use ellipse::Ellipse;
pub use line::Line;
pub use polyline::{
    seg_arc, seg_arc_radius_and_center, seg_bounding_box, seg_closest_point, seg_length,
    seg_midpoint, seg_point_at, seg_split_in_half, PlineVertex, Polyline,
};
pub use spline::{
    path_length, point_along_path, NurbsCurve, Spline, SPLINE_FALLBACK_LENGTH,
    SPLINE_TESSELLATION_SAMPLES,
};

use crate::core::{math::Vector2, traits::Real};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a shape, unique within one drawing.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub String);

impl ShapeId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        ShapeId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(value: &str) -> Self {
        ShapeId::new(value)
    }
}

impl From<String> for ShapeId {
    fn from(value: String) -> Self {
        ShapeId(value)
    }
}

/// Geometry kind tag. The declaration order is the canonical order used to dispatch pairwise
/// routines (a pair is always handled with the lower kind first).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Arc,
    Circle,
    Ellipse,
    Line,
    Polyline,
    Spline,
}

/// Geometry payload of a [Shape].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry<T = f64> {
    Line(Line<T>),
    Arc(Arc<T>),
    Circle(Circle<T>),
    Polyline(Polyline<T>),
    Spline(Spline<T>),
    Ellipse(Ellipse<T>),
}

impl<T> Geometry<T>
where
    T: Real,
{
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Line(_) => ShapeKind::Line,
            Geometry::Arc(_) => ShapeKind::Arc,
            Geometry::Circle(_) => ShapeKind::Circle,
            Geometry::Polyline(_) => ShapeKind::Polyline,
            Geometry::Spline(_) => ShapeKind::Spline,
            Geometry::Ellipse(_) => ShapeKind::Ellipse,
        }
    }
}

/// A drawing entity: an id plus its geometry.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::shape::*;
/// # use toolpath_geom::core::math::*;
/// let line = Shape::line("l1", Vector2::new(0.0, 0.0), Vector2::new(3.0, 4.0));
/// assert_eq!(line.kind(), ShapeKind::Line);
/// assert_eq!(line.length(), 5.0);
/// assert_eq!(line.point_at_parameter(0.5), Vector2::new(1.5, 2.0));
/// let rev = line.reversed();
/// assert_eq!(rev.start_point(), line.end_point());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Shape<T = f64> {
    pub id: ShapeId,
    pub geometry: Geometry<T>,
}

impl<T> Shape<T>
where
    T: Real,
{
    #[inline]
    pub fn new(id: impl Into<ShapeId>, geometry: Geometry<T>) -> Self {
        Shape {
            id: id.into(),
            geometry,
        }
    }

    pub fn line(id: impl Into<ShapeId>, start: Vector2<T>, end: Vector2<T>) -> Self {
        Shape::new(id, Geometry::Line(Line::new(start, end)))
    }

    pub fn arc(
        id: impl Into<ShapeId>,
        center: Vector2<T>,
        radius: T,
        start_angle: T,
        end_angle: T,
        clockwise: bool,
    ) -> Self {
        Shape::new(
            id,
            Geometry::Arc(Arc::new(center, radius, start_angle, end_angle, clockwise)),
        )
    }

    pub fn circle(id: impl Into<ShapeId>, center: Vector2<T>, radius: T) -> Self {
        Shape::new(id, Geometry::Circle(Circle::new(center, radius)))
    }

    pub fn polyline(id: impl Into<ShapeId>, polyline: Polyline<T>) -> Self {
        Shape::new(id, Geometry::Polyline(polyline))
    }

    pub fn spline(id: impl Into<ShapeId>, spline: Spline<T>) -> Self {
        Shape::new(id, Geometry::Spline(spline))
    }

    pub fn ellipse(id: impl Into<ShapeId>, ellipse: Ellipse<T>) -> Self {
        Shape::new(id, Geometry::Ellipse(ellipse))
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn start_point(&self) -> Vector2<T> {
        match &self.geometry {
            Geometry::Line(l) => l.start,
            Geometry::Arc(a) => a.start_point(),
            Geometry::Circle(c) => c.start_point(),
            Geometry::Polyline(p) => p.start_point().unwrap_or_else(Vector2::zero),
            Geometry::Spline(s) => s.start_point(),
            Geometry::Ellipse(e) => e.start_point(),
        }
    }

    pub fn end_point(&self) -> Vector2<T> {
        match &self.geometry {
            Geometry::Line(l) => l.end,
            Geometry::Arc(a) => a.end_point(),
            Geometry::Circle(c) => c.start_point(),
            Geometry::Polyline(p) => p.end_point().unwrap_or_else(Vector2::zero),
            Geometry::Spline(s) => s.end_point(),
            Geometry::Ellipse(e) => e.end_point(),
        }
    }

    /// Path length, 0 for degenerate geometry.
    pub fn length(&self) -> T {
        let len = match &self.geometry {
            Geometry::Line(l) => l.length(),
            Geometry::Arc(a) => a.length(),
            Geometry::Circle(c) => c.length(),
            Geometry::Polyline(p) => p.length(),
            Geometry::Spline(s) => s.length(),
            Geometry::Ellipse(e) => e.length(),
        };

        if len.is_finite() {
            len
        } else {
            T::zero()
        }
    }

    /// Point at parametric `t` in `[0, 1]` along the path, `t` is clamped.
    ///
    /// Lines interpolate linearly, arcs and circles by sweep angle, ellipses by eccentric anomaly
    /// and polylines and splines by arc length.
    pub fn point_at_parameter(&self, t: T) -> Vector2<T> {
        match &self.geometry {
            Geometry::Line(l) => l.point_at(t),
            Geometry::Arc(a) => a.point_at(t),
            Geometry::Circle(c) => c.point_at(t),
            Geometry::Polyline(p) => p.point_at(t).unwrap_or_else(Vector2::zero),
            Geometry::Spline(s) => s.point_at(t),
            Geometry::Ellipse(e) => e.point_at(t),
        }
    }

    /// Same shape traveled in the opposite direction, keeps the id. Circles are returned
    /// unchanged (start and end coincide).
    pub fn reversed(&self) -> Self {
        let geometry = match &self.geometry {
            Geometry::Line(l) => Geometry::Line(l.reversed()),
            Geometry::Arc(a) => Geometry::Arc(a.reversed()),
            Geometry::Circle(c) => Geometry::Circle(*c),
            Geometry::Polyline(p) => Geometry::Polyline(p.reversed()),
            Geometry::Spline(s) => Geometry::Spline(s.reversed()),
            Geometry::Ellipse(e) => Geometry::Ellipse(e.reversed()),
        };

        Shape {
            id: self.id.clone(),
            geometry,
        }
    }

    pub fn bounding_box(&self) -> AABB<T> {
        match &self.geometry {
            Geometry::Line(l) => l.bounding_box(),
            Geometry::Arc(a) => a.bounding_box(),
            Geometry::Circle(c) => c.bounding_box(),
            Geometry::Polyline(p) => p
                .bounding_box()
                .unwrap_or_else(|| extents::point_extents(Vector2::zero())),
            Geometry::Spline(s) => s.bounding_box(),
            Geometry::Ellipse(e) => e.bounding_box(),
        }
    }

    /// Points used to test shape connectivity.
    ///
    /// Lines give both end points, arcs their end points and center, circles their center and
    /// four axis points, polylines every vertex, splines and ellipses their end points.
    pub fn key_points(&self) -> Vec<Vector2<T>> {
        match &self.geometry {
            Geometry::Line(l) => vec![l.start, l.end],
            Geometry::Arc(a) => vec![a.start_point(), a.end_point(), a.center],
            Geometry::Circle(c) => c.key_points().to_vec(),
            Geometry::Polyline(p) => p.vertexes.iter().map(|v| v.pos()).collect(),
            Geometry::Spline(_) | Geometry::Ellipse(_) => {
                vec![self.start_point(), self.end_point()]
            }
        }
    }

    /// Returns true if the geometry is closed on its own (circle, closed polyline, full ellipse
    /// or closed spline).
    pub fn is_closed_curve(&self) -> bool {
        match &self.geometry {
            Geometry::Circle(_) => true,
            Geometry::Polyline(p) => p.is_closed,
            Geometry::Ellipse(e) => e.is_full(),
            Geometry::Spline(s) => s.closed,
            Geometry::Line(_) | Geometry::Arc(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn kind_order_is_alphabetical() {
        let mut kinds = vec![
            ShapeKind::Spline,
            ShapeKind::Line,
            ShapeKind::Arc,
            ShapeKind::Polyline,
            ShapeKind::Ellipse,
            ShapeKind::Circle,
        ];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![
                ShapeKind::Arc,
                ShapeKind::Circle,
                ShapeKind::Ellipse,
                ShapeKind::Line,
                ShapeKind::Polyline,
                ShapeKind::Spline
            ]
        );
    }

    #[test]
    fn circle_queries() {
        let c = Shape::circle("c", Vector2::new(1.0, 1.0), 2.0);
        assert_eq!(c.start_point(), c.end_point());
        assert_fuzzy_eq!(c.length(), 4.0 * PI);
        assert_fuzzy_eq!(c.point_at_parameter(0.5), Vector2::new(-1.0, 1.0));
        assert_eq!(c.key_points().len(), 5);
        assert!(c.is_closed_curve());
        assert_eq!(c.reversed(), c);
    }

    #[test]
    fn empty_polyline_falls_back() {
        let p: Shape = Shape::polyline("p", Polyline::new(false));
        assert_eq!(p.start_point(), Vector2::zero());
        assert_eq!(p.length(), 0.0);
        assert_eq!(p.point_at_parameter(0.7), Vector2::zero());
    }

    #[test]
    fn parameter_is_clamped() {
        let l = Shape::line("l", Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0));
        assert_eq!(l.point_at_parameter(-1.0), Vector2::new(0.0, 0.0));
        assert_eq!(l.point_at_parameter(2.0), Vector2::new(1.0, 0.0));
        assert_eq!(l.point_at_parameter(f64::NAN), Vector2::new(0.0, 0.0));
    }
}
