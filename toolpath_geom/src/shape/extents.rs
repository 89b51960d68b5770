//! Helpers for working with [AABB] extents of shape geometry.

use static_aabb2d_index::{
    StaticAABB2DIndex, StaticAABB2DIndexBuildError, StaticAABB2DIndexBuilder, AABB,
};

use crate::core::{
    math::{angle_is_within_sweep_eps, point_on_circle, Vector2},
    traits::Real,
};

/// Bounding box of a single point.
#[inline]
pub fn point_extents<T>(p: Vector2<T>) -> AABB<T>
where
    T: Real,
{
    AABB::new(p.x, p.y, p.x, p.y)
}

/// Smallest box containing both `a` and `b`.
#[inline]
pub fn union<T>(a: &AABB<T>, b: &AABB<T>) -> AABB<T>
where
    T: Real,
{
    AABB::new(
        num_traits::real::Real::min(a.min_x, b.min_x),
        num_traits::real::Real::min(a.min_y, b.min_y),
        num_traits::real::Real::max(a.max_x, b.max_x),
        num_traits::real::Real::max(a.max_y, b.max_y),
    )
}

/// Grow `bbox` to include `p`.
#[inline]
pub fn include_point<T>(bbox: &AABB<T>, p: Vector2<T>) -> AABB<T>
where
    T: Real,
{
    union(bbox, &point_extents(p))
}

/// Bounding box of all `points`, `None` if the iterator is empty.
pub fn points_extents<T, I>(points: I) -> Option<AABB<T>>
where
    T: Real,
    I: IntoIterator<Item = Vector2<T>>,
{
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold(point_extents(first), |acc, p| include_point(&acc, p)))
}

/// Returns true if `outer` contains `inner` with every side allowed to overshoot by `epsilon`.
#[inline]
pub fn contains<T>(outer: &AABB<T>, inner: &AABB<T>, epsilon: T) -> bool
where
    T: Real,
{
    inner.min_x >= outer.min_x - epsilon
        && inner.min_y >= outer.min_y - epsilon
        && inner.max_x <= outer.max_x + epsilon
        && inner.max_y <= outer.max_y + epsilon
}

/// Returns true if `point` lies inside `bbox` expanded by `epsilon`.
#[inline]
pub fn contains_point<T>(bbox: &AABB<T>, point: Vector2<T>, epsilon: T) -> bool
where
    T: Real,
{
    point.x >= bbox.min_x - epsilon
        && point.x <= bbox.max_x + epsilon
        && point.y >= bbox.min_y - epsilon
        && point.y <= bbox.max_y + epsilon
}

#[inline]
pub fn expanded<T>(bbox: &AABB<T>, amount: T) -> AABB<T>
where
    T: Real,
{
    AABB::new(
        bbox.min_x - amount,
        bbox.min_y - amount,
        bbox.max_x + amount,
        bbox.max_y + amount,
    )
}

#[inline]
pub fn area<T>(bbox: &AABB<T>) -> T
where
    T: Real,
{
    (bbox.max_x - bbox.min_x) * (bbox.max_y - bbox.min_y)
}

/// Exact extents of the circular arc starting at `start_angle` and sweeping the signed
/// `sweep_angle` (positive is counter clockwise).
///
/// The box is formed from the arc end points plus every axis crossing (0, PI/2, PI, 3PI/2) that
/// falls within the sweep.
pub fn arc_extents<T>(center: Vector2<T>, radius: T, start_angle: T, sweep_angle: T) -> AABB<T>
where
    T: Real,
{
    let start = point_on_circle(radius, center, start_angle);
    let end = point_on_circle(radius, center, start_angle + sweep_angle);
    let mut result = include_point(&point_extents(start), end);

    let crossings = [
        (T::zero(), Vector2::new(center.x + radius, center.y)),
        (T::half_pi(), Vector2::new(center.x, center.y + radius)),
        (T::pi(), Vector2::new(center.x - radius, center.y)),
        (
            T::pi() + T::half_pi(),
            Vector2::new(center.x, center.y - radius),
        ),
    ];

    for (a, p) in crossings {
        if angle_is_within_sweep_eps(a, start_angle, sweep_angle, T::fuzzy_epsilon()) {
            result = include_point(&result, p);
        }
    }

    result
}

/// Returns true if every coordinate of `bbox` is finite.
#[inline]
pub fn is_finite<T>(bbox: &AABB<T>) -> bool
where
    T: Real,
{
    bbox.min_x.is_finite()
        && bbox.min_y.is_finite()
        && bbox.max_x.is_finite()
        && bbox.max_y.is_finite()
}

/// Build a spatial index over `boxes`, item indexes match slice positions.
///
/// Boxes with NaN or infinite coordinates are indexed as a point one unit below and left of
/// the finite boxes, so queries may still return them and callers must check candidates
/// exactly.
///
/// # Panics
///
/// Panics if `T` fails to cast to/from a `u16`.
pub fn build_index<T>(boxes: &[AABB<T>]) -> StaticAABB2DIndex<T>
where
    T: Real,
{
    let corner = boxes
        .iter()
        .filter(|b| is_finite(b))
        .map(|b| Vector2::new(b.min_x, b.min_y))
        .reduce(|a, b| {
            Vector2::new(
                num_traits::real::Real::min(a.x, b.x),
                num_traits::real::Real::min(a.y, b.y),
            )
        })
        .unwrap_or_else(Vector2::zero);
    let placeholder = point_extents(corner - Vector2::new(T::one(), T::one()));

    let mut builder = StaticAABB2DIndexBuilder::new(boxes.len());
    for b in boxes {
        let b = if is_finite(b) { b } else { &placeholder };
        builder.add(b.min_x, b.min_y, b.max_x, b.max_y);
    }

    match builder.build() {
        Ok(index) => index,
        Err(e) => match e {
            StaticAABB2DIndexBuildError::ItemCountError { .. } => {
                unreachable!("internal library error: count mismatch when building spatial index")
            }
            StaticAABB2DIndexBuildError::NumericCastError => {
                panic!("failed to cast coordinate type: {e}")
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn quarter_arc_extents() {
        let bb = arc_extents(Vector2::new(0.0, 0.0), 2.0, 0.0, PI / 2.0);
        assert_fuzzy_eq!(bb.min_x, 0.0);
        assert_fuzzy_eq!(bb.min_y, 0.0);
        assert_fuzzy_eq!(bb.max_x, 2.0);
        assert_fuzzy_eq!(bb.max_y, 2.0);
    }

    #[test]
    fn clockwise_arc_extents_cross_bottom() {
        // clockwise from 0 to -PI passes through 3PI/2
        let bb = arc_extents(Vector2::new(0.0, 0.0), 1.0, 0.0, -PI);
        assert_fuzzy_eq!(bb.min_y, -1.0);
        assert_fuzzy_eq!(bb.max_y, 0.0);
        assert_fuzzy_eq!(bb.min_x, -1.0);
        assert_fuzzy_eq!(bb.max_x, 1.0);
    }

    #[test]
    fn contains_with_epsilon() {
        let outer = AABB::new(0.0, 0.0, 10.0, 10.0);
        let inner = AABB::new(-0.001, 1.0, 5.0, 5.0);
        assert!(!contains(&outer, &inner, 0.0));
        assert!(contains(&outer, &inner, 0.01));
    }

    #[test]
    fn non_finite_boxes_are_indexed_off_the_finite_extents() {
        let boxes = vec![
            AABB::new(0.0, 0.0, 2.0, 2.0),
            AABB::new(f64::NAN, 0.0, 1.0, 1.0),
            AABB::new(3.0, 3.0, f64::INFINITY, 4.0),
            AABB::new(1.0, 1.0, 3.0, 3.0),
        ];
        assert!(is_finite(&boxes[0]));
        assert!(!is_finite(&boxes[1]));

        let index = build_index(&boxes);
        let mut hits = index.query(0.5, 0.5, 2.5, 2.5);
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 3]);

        let mut off = index.query(-1.0, -1.0, -1.0, -1.0);
        off.sort_unstable();
        assert_eq!(off, vec![1, 2]);
    }

    #[test]
    fn only_non_finite_boxes_still_build() {
        let index = build_index(&[AABB::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN)]);
        assert_eq!(index.query(-1.0, -1.0, -1.0, -1.0), vec![0]);
    }
}
