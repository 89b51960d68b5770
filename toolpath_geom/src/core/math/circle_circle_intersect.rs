use super::Vector2;
use crate::core::traits::Real;

/// Outcome of [circle_circle_intr].
#[derive(Debug, Copy, Clone)]
pub enum CircleCircleIntr<T>
where
    T: Real,
{
    NoIntersect,
    /// The circles touch once, from outside or from inside.
    TangentIntersect { point: Vector2<T> },
    /// `point1` is right of the direction from the first center to the second, `point2` left.
    TwoIntersects {
        point1: Vector2<T>,
        point2: Vector2<T>,
    },
    /// Coincident circles.
    Overlapping,
}

/// Intersect the circle of `radius1` around `center1` with the circle of `radius2` around
/// `center2`.
///
/// Center distances within `epsilon` of the radius sum or difference count as touching.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::core::math::*;
/// let r = circle_circle_intr(30.0, Vector2::new(0.0, 0.0), 50.0, Vector2::new(80.0, 0.0), 1e-9);
/// match r {
///     CircleCircleIntr::TangentIntersect { point } => {
///         assert!(point.fuzzy_eq_eps(Vector2::new(30.0, 0.0), 1e-9))
///     }
///     r => panic!("unexpected result {:?}", r),
/// }
/// ```
pub fn circle_circle_intr<T>(
    radius1: T,
    center1: Vector2<T>,
    radius2: T,
    center2: Vector2<T>,
    epsilon: T,
) -> CircleCircleIntr<T>
where
    T: Real,
{
    use CircleCircleIntr::*;

    let between = center2 - center1;
    let d = between.length();

    if d.fuzzy_eq_zero_eps(epsilon) {
        return if radius1.fuzzy_eq_eps(radius2, epsilon) {
            Overlapping
        } else {
            NoIntersect
        };
    }

    if d > radius1 + radius2 + epsilon || d < (radius1 - radius2).abs() - epsilon {
        return NoIntersect;
    }

    let dir = between.scale(T::one() / d);
    // signed distance from center1 to the chord along dir
    let along = (d * d + radius1 * radius1 - radius2 * radius2) / (T::two() * d);
    let base = center1 + dir.scale(along);
    let half_sq = radius1 * radius1 - along * along;

    if half_sq <= T::zero() {
        return TangentIntersect { point: base };
    }

    let offset = dir.perp().scale(half_sq.sqrt());
    let point1 = base - offset;
    let point2 = base + offset;
    if point1.fuzzy_eq_eps(point2, epsilon) {
        return TangentIntersect { point: base };
    }

    TwoIntersects { point1, point2 }
}
