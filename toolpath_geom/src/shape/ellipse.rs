use static_aabb2d_index::AABB;

use super::extents;
use crate::core::{
    math::{clamp_unit, normalize_radians, Vector2},
    traits::Real,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Samples used for the extents of partial ellipses.
const PARTIAL_EXTENTS_SAMPLES: usize = 64;

/// Ellipse or elliptical arc.
///
/// `major_axis` is the vector from `center` to the end of the major axis. The minor radius is
/// `|major_axis| * |minor_to_major_ratio|`. A negative ratio mirrors the minor axis which makes
/// increasing parameters travel clockwise (used to represent reversed ellipses).
///
/// `start_param` and `end_param` are eccentric anomaly parameters in radians. Both `None` (or
/// equal values) is a full ellipse.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ellipse<T = f64> {
    pub center: Vector2<T>,
    pub major_axis: Vector2<T>,
    pub minor_to_major_ratio: T,
    pub start_param: Option<T>,
    pub end_param: Option<T>,
}

impl<T> Ellipse<T>
where
    T: Real,
{
    pub fn new(center: Vector2<T>, major_axis: Vector2<T>, minor_to_major_ratio: T) -> Self {
        Ellipse {
            center,
            major_axis,
            minor_to_major_ratio,
            start_param: None,
            end_param: None,
        }
    }

    pub fn new_arc(
        center: Vector2<T>,
        major_axis: Vector2<T>,
        minor_to_major_ratio: T,
        start_param: T,
        end_param: T,
    ) -> Self {
        Ellipse {
            center,
            major_axis,
            minor_to_major_ratio,
            start_param: Some(start_param),
            end_param: Some(end_param),
        }
    }

    #[inline]
    pub fn major_radius(&self) -> T {
        self.major_axis.length()
    }

    #[inline]
    pub fn minor_radius(&self) -> T {
        self.major_radius() * self.minor_to_major_ratio.abs()
    }

    /// Returns true if either radius is zero or any value is not finite.
    pub fn is_degenerate(&self) -> bool {
        let a = self.major_radius();
        let b = self.minor_radius();
        !a.is_finite() || !b.is_finite() || !self.center.is_finite() || a.fuzzy_eq_zero()
    }

    /// Returns true if the ellipse covers the full parameter range.
    pub fn is_full(&self) -> bool {
        match (self.start_param, self.end_param) {
            (Some(s), Some(e)) => {
                s.fuzzy_eq(e) || normalize_radians(e - s).fuzzy_eq(T::tau())
            }
            _ => true,
        }
    }

    /// Start parameter and (always positive) parameter sweep.
    pub fn param_range(&self) -> (T, T) {
        if self.is_full() {
            return (self.start_param.unwrap_or_else(T::zero), T::tau());
        }

        let s = self.start_param.unwrap_or_else(T::zero);
        let e = self.end_param.unwrap_or_else(T::tau);
        let mut sweep = normalize_radians(e - s);
        if sweep.fuzzy_eq_zero() {
            sweep = T::tau();
        }
        (s, sweep)
    }

    /// Unit major axis direction and unit minor axis direction (mirrored for a negative ratio).
    pub fn axes(&self) -> (Vector2<T>, Vector2<T>) {
        let u = self.major_axis.normalize();
        let v = if self.minor_to_major_ratio < T::zero() {
            -u.perp()
        } else {
            u.perp()
        };
        (u, v)
    }

    /// Point at eccentric anomaly `param`.
    pub fn point_at_param(&self, param: T) -> Vector2<T> {
        let (u, v) = self.axes();
        let (s, c) = param.sin_cos();
        self.center + u.scale(self.major_radius() * c) + v.scale(self.minor_radius() * s)
    }

    /// Derivative of [Ellipse::point_at_param] with respect to the parameter.
    pub fn derivative_at_param(&self, param: T) -> Vector2<T> {
        let (u, v) = self.axes();
        let (s, c) = param.sin_cos();
        u.scale(-self.major_radius() * s) + v.scale(self.minor_radius() * c)
    }

    #[inline]
    pub fn start_point(&self) -> Vector2<T> {
        self.point_at_param(self.param_range().0)
    }

    #[inline]
    pub fn end_point(&self) -> Vector2<T> {
        let (s, sweep) = self.param_range();
        self.point_at_param(s + sweep)
    }

    /// Length using Ramanujan's perimeter approximation scaled by the parameter sweep.
    pub fn length(&self) -> T {
        if self.is_degenerate() {
            return T::zero();
        }

        let a = self.major_radius();
        let b = self.minor_radius();
        let three = T::constant(3.0);
        let perimeter =
            T::pi() * (three * (a + b) - ((three * a + b) * (a + three * b)).sqrt());
        let (_, sweep) = self.param_range();
        perimeter * sweep / T::tau()
    }

    /// Point at `t` in `[0, 1]` (clamped) of the parameter range.
    pub fn point_at(&self, t: T) -> Vector2<T> {
        if self.is_degenerate() {
            return if self.center.is_finite() {
                self.center
            } else {
                Vector2::zero()
            };
        }
        let (s, sweep) = self.param_range();
        self.point_at_param(s + clamp_unit(t) * sweep)
    }

    /// Same path traveled in the opposite direction, mirrors the minor axis and negates the
    /// parameter range so the end points swap.
    pub fn reversed(&self) -> Self {
        Ellipse {
            center: self.center,
            major_axis: self.major_axis,
            minor_to_major_ratio: -self.minor_to_major_ratio,
            start_param: self.end_param.map(|e| -e),
            end_param: self.start_param.map(|s| -s),
        }
    }

    pub fn bounding_box(&self) -> AABB<T> {
        if self.is_degenerate() {
            return extents::point_extents(self.point_at(T::zero()));
        }

        if self.is_full() {
            let a = self.major_radius();
            let b = self.minor_radius();
            let (u, _) = self.axes();
            let hx = ((a * u.x).powi(2) + (b * u.y).powi(2)).sqrt();
            let hy = ((a * u.y).powi(2) + (b * u.x).powi(2)).sqrt();
            return AABB::new(
                self.center.x - hx,
                self.center.y - hy,
                self.center.x + hx,
                self.center.y + hy,
            );
        }

        let n = T::constant(PARTIAL_EXTENTS_SAMPLES as f64);
        let samples = (0..=PARTIAL_EXTENTS_SAMPLES)
            .map(|i| self.point_at(T::constant(i as f64) / n));
        extents::points_extents(samples)
            .unwrap_or_else(|| extents::point_extents(self.start_point()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn circle_like_ellipse_length() {
        let e = Ellipse::new(Vector2::new(0.0, 0.0), Vector2::new(2.0, 0.0), 1.0);
        assert_fuzzy_eq!(e.length(), 4.0 * PI, 1e-9);
        assert_fuzzy_eq!(e.start_point(), Vector2::new(2.0, 0.0));
        assert_fuzzy_eq!(e.point_at(0.25), Vector2::new(0.0, 2.0));
    }

    #[test]
    fn rotated_full_extents() {
        let e = Ellipse::new(Vector2::new(1.0, 1.0), Vector2::new(0.0, 3.0), 0.5);
        let bb = e.bounding_box();
        assert_fuzzy_eq!(bb.min_x, -0.5);
        assert_fuzzy_eq!(bb.max_x, 2.5);
        assert_fuzzy_eq!(bb.min_y, -2.0);
        assert_fuzzy_eq!(bb.max_y, 4.0);
    }

    #[test]
    fn reversed_partial_ellipse_swaps_ends() {
        let e = Ellipse::new_arc(
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            0.5,
            0.0,
            PI / 2.0,
        );
        let rev = e.reversed();
        assert_fuzzy_eq!(rev.start_point(), e.end_point());
        assert_fuzzy_eq!(rev.end_point(), e.start_point());
        assert_fuzzy_eq!(rev.point_at(0.5), e.point_at(0.5));
        assert_fuzzy_eq!(rev.length(), e.length());
        assert_eq!(rev.reversed(), e);
    }

    #[test]
    fn degenerate_ellipse_is_finite() {
        let e = Ellipse::new(Vector2::new(1.0, 2.0), Vector2::new(0.0, 0.0), 0.5);
        assert_fuzzy_eq!(e.length(), 0.0);
        assert_eq!(e.point_at(0.3), Vector2::new(1.0, 2.0));
    }
}
