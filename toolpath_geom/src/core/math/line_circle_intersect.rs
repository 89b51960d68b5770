use super::Vector2;
use crate::core::traits::Real;

/// Outcome of [line_circle_intr]. Parametric values follow `P(t) = p0 + t * (p1 - p0)` and are
/// not limited to `[0, 1]`: the whole line through `p0` and `p1` is intersected.
#[derive(Debug, Copy, Clone)]
pub enum LineCircleIntr<T>
where
    T: Real,
{
    NoIntersect,
    /// The line touches the circle once.
    TangentIntersect { t0: T },
    /// The line crosses the circle, `t0 <= t1`.
    TwoIntersects { t0: T, t1: T },
}

/// Intersect the line through `p0` and `p1` with the circle of `radius` around `circle_center`.
///
/// The center is projected onto the line, a line passing within `epsilon` of the radius is
/// reported as a tangent touch at the projected point. Coincident `p0` and `p1` are treated as a
/// point that either lies on the circle (within `epsilon`) or not.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::core::math::*;
/// let p0: Vector2<f64> = Vector2::new(-2.0, 0.0);
/// let p1 = Vector2::new(2.0, 0.0);
/// match line_circle_intr(p0, p1, 1.0, Vector2::zero(), 1e-9) {
///     LineCircleIntr::TwoIntersects { t0, t1 } => {
///         assert!((t0 - 0.25).abs() < 1e-9);
///         assert!((t1 - 0.75).abs() < 1e-9);
///     }
///     r => panic!("unexpected result {:?}", r),
/// }
/// ```
pub fn line_circle_intr<T>(
    p0: Vector2<T>,
    p1: Vector2<T>,
    radius: T,
    circle_center: Vector2<T>,
    epsilon: T,
) -> LineCircleIntr<T>
where
    T: Real,
{
    use LineCircleIntr::*;

    let dir = p1 - p0;
    let len2 = dir.length_squared();
    let to_center = circle_center - p0;

    if p0.fuzzy_eq_eps(p1, epsilon) || !(len2 > T::zero()) {
        return if to_center.length().fuzzy_eq_eps(radius, epsilon) {
            TangentIntersect { t0: T::zero() }
        } else {
            NoIntersect
        };
    }

    // foot of the perpendicular from the center
    let t_foot = to_center.dot(dir) / len2;
    let foot = p0 + dir.scale(t_foot);
    let center_dist = (foot - circle_center).length();

    if center_dist > radius + epsilon {
        return NoIntersect;
    }

    if center_dist.fuzzy_eq_eps(radius, epsilon) {
        return TangentIntersect { t0: t_foot };
    }

    // half chord length in parametric units, abs absorbs rounding just inside the radius
    let half_chord = (radius * radius - center_dist * center_dist).abs().sqrt();
    let dt = half_chord / len2.sqrt();
    TwoIntersects {
        t0: t_foot - dt,
        t1: t_foot + dt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_chord() {
        let r = line_circle_intr(
            Vector2::new(3.0, -10.0),
            Vector2::new(3.0, 10.0),
            5.0,
            Vector2::new(0.0, 0.0),
            1e-9,
        );
        match r {
            LineCircleIntr::TwoIntersects { t0, t1 } => {
                // y = -4 and y = 4
                assert_fuzzy_eq!(t0, 0.3);
                assert_fuzzy_eq!(t1, 0.7);
            }
            r => panic!("unexpected result {r:?}"),
        }
    }

    #[test]
    fn tangent_and_miss() {
        let c = Vector2::new(1.0, 1.0);
        match line_circle_intr(Vector2::new(0.0, 3.0), Vector2::new(4.0, 3.0), 2.0, c, 1e-9) {
            LineCircleIntr::TangentIntersect { t0 } => assert_fuzzy_eq!(t0, 0.25),
            r => panic!("unexpected result {r:?}"),
        }
        assert!(matches!(
            line_circle_intr(Vector2::new(0.0, 3.5), Vector2::new(4.0, 3.5), 2.0, c, 1e-9),
            LineCircleIntr::NoIntersect
        ));
    }

    #[test]
    fn crossing_outside_segment_keeps_params() {
        match line_circle_intr(
            Vector2::new(10.0, 0.0),
            Vector2::new(20.0, 0.0),
            1.0,
            Vector2::zero(),
            1e-9,
        ) {
            LineCircleIntr::TwoIntersects { t0, t1 } => {
                assert_fuzzy_eq!(t0, -1.1);
                assert_fuzzy_eq!(t1, -0.9);
            }
            r => panic!("unexpected result {r:?}"),
        }
    }
}
