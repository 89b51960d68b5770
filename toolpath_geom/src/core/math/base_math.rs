use super::Vector2;
use crate::core::traits::Real;

/// Wrap `angle` into `[0, 2PI]`.
///
/// Angles already inside the range are returned as is, so a stored end angle of exactly `2PI`
/// keeps describing a full turn.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::core::math::*;
/// # use toolpath_geom::core::traits::*;
/// use std::f64::consts::PI;
/// assert!(normalize_radians(5.0 * PI).fuzzy_eq(PI));
/// assert!(normalize_radians(-PI / 4.0).fuzzy_eq(7.0 * PI / 4.0));
/// assert!(normalize_radians(2.0 * PI).fuzzy_eq(2.0 * PI));
/// ```
#[inline]
pub fn normalize_radians<T>(angle: T) -> T
where
    T: Real,
{
    let tau = T::tau();
    if angle >= T::zero() && angle <= tau {
        angle
    } else {
        angle - (angle / tau).floor() * tau
    }
}

/// Counter clockwise travel from `from` to `to`, in `[0, 2PI]`.
#[inline]
fn ccw_travel<T>(from: T, to: T) -> T
where
    T: Real,
{
    normalize_radians(to - from)
}

/// Returns true if `test_angle` lies on the signed `sweep_angle` leaving `start_angle`, with
/// `epsilon` slack at both ends.
///
/// Positive sweeps turn counter clockwise, negative sweeps clockwise. Sweeps of a full turn (or
/// more) contain every angle.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::core::math::*;
/// use std::f64::consts::PI;
/// assert!(angle_is_within_sweep_eps(PI / 4.0, 0.0, PI / 2.0, 1e-9));
/// assert!(!angle_is_within_sweep_eps(PI / 4.0, 0.0, -PI / 2.0, 1e-9));
/// assert!(angle_is_within_sweep_eps(-PI / 4.0, 0.0, -PI / 2.0, 1e-9));
/// assert!(angle_is_within_sweep_eps(3.0, 0.0, 2.0 * PI, 1e-9));
/// ```
#[inline]
pub fn angle_is_within_sweep_eps<T>(
    test_angle: T,
    start_angle: T,
    sweep_angle: T,
    epsilon: T,
) -> bool
where
    T: Real,
{
    let span = sweep_angle.abs();
    if span >= T::tau() - epsilon {
        return true;
    }

    // walk the sweep counter clockwise from whichever end comes first in that direction
    let from = if sweep_angle < T::zero() {
        start_angle + sweep_angle
    } else {
        start_angle
    };
    let travel = ccw_travel(from, test_angle);

    travel < span + epsilon || travel > T::tau() - epsilon
}

/// Travel from `start_angle` to `test_angle` in the turning direction of `sweep_angle`.
///
/// The result carries the sign of the sweep and has a magnitude in `[0, 2PI)`.
#[inline]
pub fn directed_angle_from<T>(start_angle: T, test_angle: T, sweep_angle: T) -> T
where
    T: Real,
{
    let clockwise = sweep_angle < T::zero();
    let travel = if clockwise {
        ccw_travel(test_angle, start_angle)
    } else {
        ccw_travel(start_angle, test_angle)
    };
    let travel = if travel >= T::tau() { T::zero() } else { travel };

    if clockwise {
        -travel
    } else {
        travel
    }
}

#[inline]
pub fn dist_squared<T>(p0: Vector2<T>, p1: Vector2<T>) -> T
where
    T: Real,
{
    (p1 - p0).length_squared()
}

/// Direction angle of the vector from `p0` to `p1`.
#[inline]
pub fn angle<T>(p0: Vector2<T>, p1: Vector2<T>) -> T
where
    T: Real,
{
    let d = p1 - p0;
    d.y.atan2(d.x)
}

#[inline]
pub fn midpoint<T>(p0: Vector2<T>, p1: Vector2<T>) -> Vector2<T>
where
    T: Real,
{
    (p0 + p1).scale(T::constant(0.5))
}

/// Point at polar `angle` on the circle around `center`.
#[inline]
pub fn point_on_circle<T>(radius: T, center: Vector2<T>, angle: T) -> Vector2<T>
where
    T: Real,
{
    let (s, c) = angle.sin_cos();
    center + Vector2::new(c, s).scale(radius)
}

/// Point at parametric `t` along `p0 -> p1`, `t` outside `[0, 1]` extrapolates.
#[inline]
pub fn point_from_parametric<T>(p0: Vector2<T>, p1: Vector2<T>, t: T) -> Vector2<T>
where
    T: Real,
{
    p0 + (p1 - p0).scale(t)
}

/// Parametric value of `point` on the line through `p0` and `p1`.
///
/// `point` is assumed to lie on the line. The coordinate with the larger extent is used so
/// near vertical and near horizontal lines stay stable, coincident `p0` and `p1` give zero.
#[inline]
pub fn parametric_from_point<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>, epsilon: T) -> T
where
    T: Real,
{
    let d = p1 - p0;
    if d.x.abs() >= d.y.abs() {
        if d.x.fuzzy_eq_zero_eps(epsilon) {
            return T::zero();
        }
        (point.x - p0.x) / d.x
    } else {
        (point.y - p0.y) / d.y
    }
}

/// Closest point to `point` on the segment `p0 -> p1`.
#[inline]
pub fn line_seg_closest_point<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> Vector2<T>
where
    T: Real,
{
    let seg = p1 - p0;
    let along = (point - p0).dot(seg);
    if along < T::fuzzy_epsilon() {
        return p0;
    }

    let seg_len2 = seg.length_squared();
    if along + T::fuzzy_epsilon() > seg_len2 {
        return p1;
    }

    p0 + seg.scale(along / seg_len2)
}

/// Twice the signed area of the triangle `p0, p1, point`, positive when `point` is to the left.
#[inline]
fn side_value<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> T
where
    T: Real,
{
    (p1 - p0).perp_dot(point - p0)
}

/// Returns true if `point` is strictly left of the direction `p0 -> p1`.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::core::math::*;
/// let p0 = Vector2::new(1.0, 1.0);
/// let p1 = Vector2::new(2.0, 2.0);
/// assert!(is_left(p0, p1, Vector2::new(0.0, 1.0)));
/// assert!(!is_left(p0, p1, Vector2::new(1.0, 0.0)));
/// ```
#[inline]
pub fn is_left<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> bool
where
    T: Real,
{
    side_value(p0, p1, point) > T::zero()
}

/// [is_left] counting points on the line as left.
#[inline]
pub fn is_left_or_equal<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> bool
where
    T: Real,
{
    side_value(p0, p1, point) >= T::zero()
}

/// Polyline bulge of an arc segment sweeping `angle` radians.
#[inline]
pub fn bulge_from_angle<T>(angle: T) -> T
where
    T: Real,
{
    (angle / T::four()).tan()
}

/// Signed sweep of an arc segment with `bulge`.
#[inline]
pub fn angle_from_bulge<T>(bulge: T) -> T
where
    T: Real,
{
    bulge.atan() * T::four()
}

/// Clamp a curve parameter into `[0, 1]`, NaN and infinities clamp to 0.
#[inline]
pub fn clamp_unit<T>(t: T) -> T
where
    T: Real,
{
    if !t.is_finite() || t <= T::zero() {
        T::zero()
    } else if t >= T::one() {
        T::one()
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn directed_travel_follows_sweep_sign() {
        assert_fuzzy_eq!(directed_angle_from(0.0, PI / 2.0, 1.0), PI / 2.0);
        assert_fuzzy_eq!(directed_angle_from(0.0, PI / 2.0, -1.0), -3.0 * PI / 2.0);
        assert_fuzzy_eq!(directed_angle_from(1.0, 1.0, -1.0), 0.0);
    }

    #[test]
    fn sweep_membership_across_zero() {
        // clockwise from 10 degrees down to -20 degrees
        let start = 10f64.to_radians();
        let sweep = -30f64.to_radians();
        assert!(angle_is_within_sweep_eps(0.0, start, sweep, 1e-9));
        assert!(angle_is_within_sweep_eps(2.0 * PI - 0.1, start, sweep, 1e-9));
        assert!(!angle_is_within_sweep_eps(PI, start, sweep, 1e-9));
    }

    #[test]
    fn parametric_on_steep_segment() {
        let p0 = Vector2::new(1.0, 0.0);
        let p1 = Vector2::new(1.0 + 1e-12, 10.0);
        assert_fuzzy_eq!(parametric_from_point(p0, p1, Vector2::new(1.0, 2.5), 1e-9), 0.25);
    }

    #[test]
    fn half_circle_bulge() {
        assert_fuzzy_eq!(bulge_from_angle(PI), 1.0);
        assert_fuzzy_eq!(angle_from_bulge(-1.0), -PI);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(1.5), 1.0);
    }
}
