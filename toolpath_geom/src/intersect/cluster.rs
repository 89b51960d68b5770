use std::cmp::Ordering;

use super::{IntersectionResult, IntersectionType, MIXED_CLUSTER_FACTOR};
use crate::{
    core::{
        math::{dist_squared, Vector2},
        traits::Real,
    },
    shape::Shape,
};

/// Merge results whose points lie closer than `tolerance`.
///
/// Results are sorted by `x` then `y` and swept once from left to right, each unused result
/// seeds a cluster and absorbs later unused results within `tolerance` of it. A cluster becomes
/// one result at the centroid of its members, other fields are taken from the member with the
/// highest confidence. If members disagree on type the result is
/// [IntersectionType::Approximate] with lowered confidence.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::intersect::*;
/// # use toolpath_geom::core::math::*;
/// let a = IntersectionResult::new(Vector2::new(1.0, 1.0), 0.5, 0.25);
/// let b = IntersectionResult::new(Vector2::new(1.0, 1.0 + 1e-7), 0.5, 0.25);
/// let c = IntersectionResult::new(Vector2::new(4.0, 0.0), 1.0, 0.0);
/// let merged = cluster_results(vec![c, b, a], 1e-5);
/// assert_eq!(merged.len(), 2);
/// assert!(merged[0].point.fuzzy_eq_eps(Vector2::new(1.0, 1.0), 1e-6));
/// ```
pub fn cluster_results<T>(
    mut results: Vec<IntersectionResult<T>>,
    tolerance: T,
) -> Vec<IntersectionResult<T>>
where
    T: Real,
{
    if results.len() < 2 {
        return results;
    }

    results.sort_by(|a, b| {
        a.point
            .x
            .partial_cmp(&b.point.x)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.point.y.partial_cmp(&b.point.y).unwrap_or(Ordering::Equal))
    });

    let tol2 = tolerance * tolerance;
    let mut used = vec![false; results.len()];
    let mut merged = Vec::new();
    let mut members = Vec::new();

    for i in 0..results.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        members.clear();
        members.push(i);

        let seed = results[i].point;
        for j in (i + 1)..results.len() {
            if results[j].point.x - seed.x > tolerance {
                break;
            }
            if !used[j] && dist_squared(seed, results[j].point) < tol2 {
                used[j] = true;
                members.push(j);
            }
        }

        merged.push(merge_cluster(&results, &members));
    }

    merged
}

fn merge_cluster<T>(results: &[IntersectionResult<T>], members: &[usize]) -> IntersectionResult<T>
where
    T: Real,
{
    let first = results[members[0]];
    if members.len() == 1 {
        return first;
    }

    let count = T::constant(members.len() as f64);
    let sum = members
        .iter()
        .fold(Vector2::zero(), |acc, &m| acc + results[m].point);
    let centroid = sum.scale(T::one() / count);

    let mut best = first;
    for &m in &members[1..] {
        if results[m].confidence > best.confidence {
            best = results[m];
        }
    }

    let all_same = members
        .iter()
        .all(|&m| results[m].intersection_type == first.intersection_type);

    let mut out = IntersectionResult {
        point: centroid,
        ..best
    };

    if !all_same {
        out.intersection_type = IntersectionType::Approximate;
        out.confidence = best.confidence * T::constant(MIXED_CLUSTER_FACTOR);
    }

    out
}

/// Pick the one result closest to any end point of `shape_a` or `shape_b`, ties keep the first.
pub fn select_consecutive_offset<T>(
    results: &[IntersectionResult<T>],
    shape_a: &Shape<T>,
    shape_b: &Shape<T>,
) -> Option<IntersectionResult<T>>
where
    T: Real,
{
    let ends = [
        shape_a.start_point(),
        shape_a.end_point(),
        shape_b.start_point(),
        shape_b.end_point(),
    ];

    let score = |r: &IntersectionResult<T>| {
        ends.iter()
            .map(|&e| dist_squared(e, r.point))
            .fold(<T as num_traits::Bounded>::max_value(), |acc, d| {
                num_traits::real::Real::min(acc, d)
            })
    };

    let mut best: Option<(T, IntersectionResult<T>)> = None;
    for r in results {
        let s = score(r);
        match best {
            Some((best_score, _)) if !(s < best_score) => {}
            _ => best = Some((s, *r)),
        }
    }

    best.map(|(_, r)| r)
}
