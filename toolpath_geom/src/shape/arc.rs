use static_aabb2d_index::AABB;

use super::extents;
use crate::core::{
    math::{clamp_unit, normalize_radians, point_on_circle, Vector2},
    traits::Real,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Circular arc defined by center, radius and start/end angles in radians.
///
/// The arc travels from `start_angle` to `end_angle` counter clockwise, or clockwise when
/// `clockwise` is true. Angles are not required to be normalized, a counter clockwise arc from
/// `0` to `2PI` is a full circle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Arc<T = f64> {
    pub center: Vector2<T>,
    pub radius: T,
    pub start_angle: T,
    pub end_angle: T,
    pub clockwise: bool,
}

impl<T> Arc<T>
where
    T: Real,
{
    #[inline]
    pub fn new(
        center: Vector2<T>,
        radius: T,
        start_angle: T,
        end_angle: T,
        clockwise: bool,
    ) -> Self {
        Arc {
            center,
            radius,
            start_angle,
            end_angle,
            clockwise,
        }
    }

    /// Signed sweep angle of the arc, positive for counter clockwise. Magnitude is in `[0, 2PI]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use toolpath_geom::shape::*;
    /// # use toolpath_geom::core::math::*;
    /// # use toolpath_geom::core::traits::*;
    /// use std::f64::consts::PI;
    /// let arc = Arc::new(Vector2::zero(), 1.0, 0.0, PI / 2.0, false);
    /// assert!(arc.sweep_angle().fuzzy_eq(PI / 2.0));
    /// let cw = Arc::new(Vector2::zero(), 1.0, 0.0, PI / 2.0, true);
    /// assert!(cw.sweep_angle().fuzzy_eq(-3.0 * PI / 2.0));
    /// ```
    pub fn sweep_angle(&self) -> T {
        let raw = if self.clockwise {
            self.start_angle - self.end_angle
        } else {
            self.end_angle - self.start_angle
        };

        let mut sweep = normalize_radians(raw);
        // whole turns that round down to a tiny remainder are full circles
        if sweep.fuzzy_eq_zero() && !raw.fuzzy_eq_zero() {
            sweep = T::tau();
        }

        if self.clockwise {
            -sweep
        } else {
            sweep
        }
    }

    /// Returns true if the radius is not a finite positive value.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !self.radius.is_finite() || self.radius <= T::zero() || !self.center.is_finite()
    }

    #[inline]
    pub fn start_point(&self) -> Vector2<T> {
        point_on_circle(self.radius, self.center, self.start_angle)
    }

    #[inline]
    pub fn end_point(&self) -> Vector2<T> {
        point_on_circle(self.radius, self.center, self.end_angle)
    }

    pub fn length(&self) -> T {
        if self.is_degenerate() {
            return T::zero();
        }
        self.sweep_angle().abs() * self.radius
    }

    /// Point at parametric `t` in `[0, 1]` (clamped), measured along the sweep.
    #[inline]
    pub fn point_at(&self, t: T) -> Vector2<T> {
        point_on_circle(
            self.radius,
            self.center,
            self.start_angle + clamp_unit(t) * self.sweep_angle(),
        )
    }

    /// Same path traveled in the opposite direction.
    #[inline]
    pub fn reversed(&self) -> Self {
        Arc::new(
            self.center,
            self.radius,
            self.end_angle,
            self.start_angle,
            !self.clockwise,
        )
    }

    #[inline]
    pub fn bounding_box(&self) -> AABB<T> {
        extents::arc_extents(
            self.center,
            self.radius,
            self.start_angle,
            self.sweep_angle(),
        )
    }

    /// Returns the arc with its sweep lengthened by `distance` (arc length) at both ends. The
    /// result never sweeps more than a full circle.
    pub fn extended(&self, distance: T) -> Self {
        if self.is_degenerate() {
            return *self;
        }

        let sweep = self.sweep_angle();
        let room = (T::tau() - sweep.abs()) / T::two();
        let delta = num_traits::real::Real::min(distance / self.radius, room);
        if delta <= T::zero() {
            return *self;
        }

        let signed = if sweep < T::zero() { -delta } else { delta };
        Arc::new(
            self.center,
            self.radius,
            self.start_angle - signed,
            self.end_angle + signed,
            self.clockwise,
        )
    }
}

/// Full circle. Parametric queries start at angle 0 and travel counter clockwise.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle<T = f64> {
    pub center: Vector2<T>,
    pub radius: T,
}

impl<T> Circle<T>
where
    T: Real,
{
    #[inline]
    pub fn new(center: Vector2<T>, radius: T) -> Self {
        Circle { center, radius }
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !self.radius.is_finite() || self.radius <= T::zero() || !self.center.is_finite()
    }

    /// The point at angle 0, which is both the start and end of the circle path.
    #[inline]
    pub fn start_point(&self) -> Vector2<T> {
        Vector2::new(self.center.x + self.radius, self.center.y)
    }

    pub fn length(&self) -> T {
        if self.is_degenerate() {
            return T::zero();
        }
        T::tau() * self.radius
    }

    #[inline]
    pub fn point_at(&self, t: T) -> Vector2<T> {
        point_on_circle(self.radius, self.center, clamp_unit(t) * T::tau())
    }

    #[inline]
    pub fn bounding_box(&self) -> AABB<T> {
        AABB::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    /// Center plus the four axis aligned points on the circle.
    pub fn key_points(&self) -> [Vector2<T>; 5] {
        let c = self.center;
        let r = self.radius;
        [
            c,
            Vector2::new(c.x + r, c.y),
            Vector2::new(c.x, c.y + r),
            Vector2::new(c.x - r, c.y),
            Vector2::new(c.x, c.y - r),
        ]
    }

    /// Counter clockwise arc from `0` to `2PI` tracing the same path.
    #[inline]
    pub fn to_arc(&self) -> Arc<T> {
        Arc::new(self.center, self.radius, T::zero(), T::tau(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn clockwise_sweep_and_points() {
        let arc = Arc::new(Vector2::new(0.0, 0.0), 2.0, PI / 2.0, 0.0, true);
        assert_fuzzy_eq!(arc.sweep_angle(), -PI / 2.0);
        assert_fuzzy_eq!(arc.length(), PI);
        assert_fuzzy_eq!(arc.point_at(0.0), Vector2::new(0.0, 2.0));
        assert_fuzzy_eq!(arc.point_at(1.0), Vector2::new(2.0, 0.0));
        let mid = arc.point_at(0.5);
        assert_fuzzy_eq!(mid, Vector2::new(2.0_f64.sqrt(), 2.0_f64.sqrt()));
    }

    #[test]
    fn reversal_is_involution() {
        let arc = Arc::new(Vector2::new(1.0, 1.0), 3.0, 0.3, 2.1, false);
        let rev = arc.reversed();
        assert_fuzzy_eq!(rev.start_point(), arc.end_point());
        assert_fuzzy_eq!(rev.end_point(), arc.start_point());
        assert_fuzzy_eq!(rev.sweep_angle(), -arc.sweep_angle());
        assert_eq!(rev.reversed(), arc);
    }

    #[test]
    fn full_sweep_survives() {
        let arc = Circle::new(Vector2::new(0.0, 0.0), 1.0).to_arc();
        assert_fuzzy_eq!(arc.sweep_angle(), 2.0 * PI);
        assert_fuzzy_eq!(arc.reversed().sweep_angle(), -2.0 * PI);
    }

    #[test]
    fn extension_is_capped_at_full_circle() {
        let arc = Arc::new(Vector2::new(0.0, 0.0), 1.0, 0.0, PI, false);
        let ext = arc.extended(0.5);
        assert_fuzzy_eq!(ext.sweep_angle(), PI + 1.0);
        let capped = arc.extended(100.0);
        assert_fuzzy_eq!(capped.sweep_angle(), 2.0 * PI);
    }

    #[test]
    fn degenerate_radius_has_zero_length() {
        let arc = Arc::new(Vector2::new(0.0, 0.0), 0.0, 0.0, PI, false);
        assert_fuzzy_eq!(arc.length(), 0.0);
        let circle = Circle::new(Vector2::new(0.0, 0.0), -1.0);
        assert_fuzzy_eq!(circle.length(), 0.0);
    }
}
