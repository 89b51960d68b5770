use static_aabb2d_index::AABB;

use super::extents;
use crate::core::{
    math::{clamp_unit, point_from_parametric, Vector2},
    traits::Real,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Straight line segment from `start` to `end`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Line<T = f64> {
    pub start: Vector2<T>,
    pub end: Vector2<T>,
}

impl<T> Line<T>
where
    T: Real,
{
    #[inline]
    pub fn new(start: Vector2<T>, end: Vector2<T>) -> Self {
        Line { start, end }
    }

    #[inline]
    pub fn length(&self) -> T {
        (self.end - self.start).length()
    }

    /// Point at parametric `t` in `[0, 1]` (clamped).
    #[inline]
    pub fn point_at(&self, t: T) -> Vector2<T> {
        point_from_parametric(self.start, self.end, clamp_unit(t))
    }

    #[inline]
    pub fn reversed(&self) -> Self {
        Line::new(self.end, self.start)
    }

    #[inline]
    pub fn bounding_box(&self) -> AABB<T> {
        extents::include_point(&extents::point_extents(self.start), self.end)
    }

    /// Returns the line with both ends pushed out along its direction by `distance`. A zero
    /// length line is returned unchanged.
    pub fn extended(&self, distance: T) -> Self {
        let dir = (self.end - self.start).normalize();
        Line::new(
            self.start - dir.scale(distance),
            self.end + dir.scale(distance),
        )
    }
}
