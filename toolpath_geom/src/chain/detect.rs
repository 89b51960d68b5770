use tracing::debug;

use super::{union_find::UnionFind, Chain};
use crate::{
    core::{
        math::{dist_squared, Vector2},
        traits::Real,
    },
    shape::{extents, Shape},
};

/// Group `shapes` into chains of connected shapes.
///
/// Two shapes are connected when any of their [key points](Shape::key_points) lie closer than
/// `tolerance`. Every connected component becomes one chain (unconnected shapes become single
/// shape chains). Chains keep shapes in input order and are ordered by their first shape, chain
/// ids are `chain-1`, `chain-2`, ...
///
/// # Examples
///
/// ```
/// # use toolpath_geom::shape::*;
/// # use toolpath_geom::chain::*;
/// # use toolpath_geom::core::math::*;
/// let shapes = vec![
///     Shape::line("a", Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)),
///     Shape::line("far", Vector2::new(5.0, 5.0), Vector2::new(6.0, 5.0)),
///     Shape::line("b", Vector2::new(1.0, 0.0), Vector2::new(1.0, 1.0)),
/// ];
/// let chains = detect_chains(&shapes, 1e-3);
/// assert_eq!(chains.len(), 2);
/// assert_eq!(chains[0].len(), 2);
/// assert_eq!(chains[1].shapes[0].id.as_str(), "far");
/// ```
pub fn detect_chains<T>(shapes: &[Shape<T>], tolerance: T) -> Vec<Chain<T>>
where
    T: Real,
{
    if shapes.is_empty() {
        return Vec::new();
    }

    let key_points: Vec<Vec<Vector2<T>>> = shapes.iter().map(|s| s.key_points()).collect();
    let boxes: Vec<_> = key_points
        .iter()
        .map(|pts| {
            let bb = extents::points_extents(pts.iter().copied())
                .unwrap_or_else(|| extents::point_extents(Vector2::zero()));
            extents::expanded(&bb, tolerance)
        })
        .collect();
    let index = extents::build_index(&boxes);

    let mut uf = UnionFind::new(shapes.len());
    for (i, bb) in boxes.iter().enumerate() {
        let mut candidates = index.query(bb.min_x, bb.min_y, bb.max_x, bb.max_y);
        candidates.retain(|&j| j > i);
        candidates.sort_unstable();

        for j in candidates {
            if keys_connected(&key_points[i], &key_points[j], tolerance) {
                uf.union(i, j);
            }
        }
    }

    let chains: Vec<_> = uf
        .groups()
        .into_iter()
        .enumerate()
        .map(|(n, members)| {
            let shapes = members.into_iter().map(|i| shapes[i].clone()).collect();
            Chain::new(format!("chain-{}", n + 1).as_str(), shapes)
        })
        .collect();

    debug!(
        shape_count = shapes.len(),
        chain_count = chains.len(),
        "detected chains"
    );

    chains
}

fn keys_connected<T>(a: &[Vector2<T>], b: &[Vector2<T>], tolerance: T) -> bool
where
    T: Real,
{
    let tol2 = tolerance * tolerance;
    a.iter()
        .any(|&p| b.iter().any(|&q| dist_squared(p, q) < tol2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_center_connects_to_line() {
        // circle key points include the center
        let shapes = vec![
            Shape::circle("c", Vector2::new(0.0, 0.0), 5.0),
            Shape::line("l", Vector2::new(0.0, 0.0), Vector2::new(-3.0, -3.0)),
        ];
        let chains = detect_chains(&shapes, 1e-6);
        assert_eq!(chains.len(), 1);
    }

    #[test]
    fn transitive_connection() {
        let shapes = vec![
            Shape::line("a", Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)),
            Shape::line("c", Vector2::new(2.0, 0.0), Vector2::new(3.0, 0.0)),
            Shape::line("b", Vector2::new(1.0, 0.0), Vector2::new(2.0, 0.0)),
        ];
        let chains = detect_chains(&shapes, 1e-6);
        assert_eq!(chains.len(), 1);
        let ids: Vec<_> = chains[0].shape_ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "b"]);
        assert_eq!(chains[0].id.as_str(), "chain-1");
    }

    #[test]
    fn distance_equal_to_tolerance_is_not_connected() {
        let shapes = vec![
            Shape::line("a", Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)),
            Shape::line("b", Vector2::new(1.5, 0.0), Vector2::new(2.0, 0.0)),
        ];
        assert_eq!(detect_chains(&shapes, 0.5).len(), 2);
        assert_eq!(detect_chains(&shapes, 0.5001).len(), 1);
    }
}
