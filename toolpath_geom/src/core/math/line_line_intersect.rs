use super::{base_math::parametric_from_point, Vector2};
use crate::core::traits::Real;

/// Outcome of [line_line_intr]. Parametric values follow `P(t) = start + t * (end - start)` of
/// the respective segment.
#[derive(Debug, Copy, Clone)]
pub enum LineLineIntr<T>
where
    T: Real,
{
    /// Parallel lines, or collinear segments (or points) with no shared span.
    NoIntersect,
    /// The segments meet inside both spans.
    TrueIntersect { seg1_t: T, seg2_t: T },
    /// Collinear segments sharing the span `[seg2_t0, seg2_t1]` of the second segment.
    Overlapping { seg2_t0: T, seg2_t1: T },
    /// The supporting lines cross outside at least one of the spans.
    FalseIntersect { seg1_t: T, seg2_t: T },
}

/// Intersect segment `a0 -> a1` with segment `b0 -> b1`.
///
/// Span membership is decided in length units: a crossing counts as inside when it is within
/// `epsilon` of the segment. Zero length segments are treated as points.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::core::math::*;
/// let a0 = Vector2::new(0.0, 0.0);
/// let a1 = Vector2::new(1.0, 0.0);
/// let b0 = Vector2::new(0.5, -1.0);
/// let b1 = Vector2::new(0.5, 1.0);
/// match line_line_intr(a0, a1, b0, b1, 1e-9) {
///     LineLineIntr::TrueIntersect { seg1_t, seg2_t } => {
///         assert_eq!(seg1_t, 0.5);
///         assert_eq!(seg2_t, 0.5);
///     }
///     r => panic!("unexpected result {:?}", r),
/// }
/// ```
pub fn line_line_intr<T>(
    a0: Vector2<T>,
    a1: Vector2<T>,
    b0: Vector2<T>,
    b1: Vector2<T>,
    epsilon: T,
) -> LineLineIntr<T>
where
    T: Real,
{
    use LineLineIntr::*;

    let da = a1 - a0;
    let db = b1 - b0;
    let offset = a0 - b0;
    let denom = da.perp_dot(db);

    if !denom.fuzzy_eq_zero_eps(epsilon) {
        let seg1_t = db.perp_dot(offset) / denom;
        let seg2_t = da.perp_dot(offset) / denom;
        let inside = within_span(seg1_t, da.length(), epsilon)
            && within_span(seg2_t, db.length(), epsilon);
        return if inside {
            TrueIntersect { seg1_t, seg2_t }
        } else {
            FalseIntersect { seg1_t, seg2_t }
        };
    }

    // parallel, only collinear input can still meet
    if !da.perp_dot(offset).fuzzy_eq_zero_eps(epsilon)
        || !db.perp_dot(offset).fuzzy_eq_zero_eps(epsilon)
    {
        return NoIntersect;
    }

    let a_is_point = a0.fuzzy_eq_eps(a1, epsilon);
    let b_is_point = b0.fuzzy_eq_eps(b1, epsilon);
    match (a_is_point, b_is_point) {
        (true, true) => {
            if a0.fuzzy_eq_eps(b0, epsilon) {
                TrueIntersect {
                    seg1_t: T::zero(),
                    seg2_t: T::zero(),
                }
            } else {
                NoIntersect
            }
        }
        (true, false) => match point_on_segment(a0, b0, b1, epsilon) {
            Some(seg2_t) => TrueIntersect {
                seg1_t: T::zero(),
                seg2_t,
            },
            None => NoIntersect,
        },
        (false, true) => match point_on_segment(b0, a0, a1, epsilon) {
            Some(seg1_t) => TrueIntersect {
                seg1_t,
                seg2_t: T::zero(),
            },
            None => NoIntersect,
        },
        (false, false) => collinear_overlap(a0, a1, b0, b1, epsilon),
    }
}

#[inline]
fn within_span<T>(t: T, length: T, epsilon: T) -> bool
where
    T: Real,
{
    (t * length).fuzzy_in_range_eps(T::zero(), length, epsilon)
}

/// Parametric position of `point` on the collinear segment `s0 -> s1` if it lies on the span.
fn point_on_segment<T>(point: Vector2<T>, s0: Vector2<T>, s1: Vector2<T>, epsilon: T) -> Option<T>
where
    T: Real,
{
    let t = parametric_from_point(s0, s1, point, epsilon);
    within_span(t, (s1 - s0).length(), epsilon).then_some(t)
}

/// Shared span of two collinear segments, measured along `b0 -> b1`.
fn collinear_overlap<T>(
    a0: Vector2<T>,
    a1: Vector2<T>,
    b0: Vector2<T>,
    b1: Vector2<T>,
    epsilon: T,
) -> LineLineIntr<T>
where
    T: Real,
{
    let b_len = (b1 - b0).length();
    let ta0 = parametric_from_point(b0, b1, a0, epsilon);
    let ta1 = parametric_from_point(b0, b1, a1, epsilon);
    let (lo, hi) = if ta0 <= ta1 { (ta0, ta1) } else { (ta1, ta0) };

    if !(lo * b_len).fuzzy_lt_eps(b_len, epsilon) || !(hi * b_len).fuzzy_gt_eps(T::zero(), epsilon)
    {
        return LineLineIntr::NoIntersect;
    }

    let seg2_t0 = num_traits::real::Real::max(lo, T::zero());
    let seg2_t1 = num_traits::real::Real::min(hi, T::one());

    if ((seg2_t1 - seg2_t0) * b_len).fuzzy_eq_zero_eps(epsilon) {
        // the segments only touch end to end
        let seg1_t = if a0.fuzzy_eq_eps(b0, epsilon) || a0.fuzzy_eq_eps(b1, epsilon) {
            T::zero()
        } else {
            T::one()
        };
        return LineLineIntr::TrueIntersect {
            seg1_t,
            seg2_t: seg2_t0,
        };
    }

    LineLineIntr::Overlapping { seg2_t0, seg2_t1 }
}
