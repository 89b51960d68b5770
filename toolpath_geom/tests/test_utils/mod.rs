#![allow(dead_code)]

use toolpath_geom::{
    chain::Chain,
    core::{math::Vector2, traits::FuzzyEq},
    intersect::IntersectionResult,
    shape::Shape,
};

pub fn line(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
    Shape::line(id, Vector2::new(x0, y0), Vector2::new(x1, y1))
}

/// Counter clockwise rectangle chain of four lines with ids `{id}-0` .. `{id}-3`.
pub fn rect_chain(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Chain {
    Chain::new(id, rect_shapes(id, x0, y0, x1, y1))
}

pub fn rect_shapes(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Shape> {
    let p = [
        Vector2::new(x0, y0),
        Vector2::new(x1, y0),
        Vector2::new(x1, y1),
        Vector2::new(x0, y1),
    ];
    (0..4)
        .map(|i| Shape::line(format!("{id}-{i}"), p[i], p[(i + 1) % 4]))
        .collect()
}

pub fn shape_ids(chain: &Chain) -> Vec<&str> {
    chain.shape_ids().map(|id| id.as_str()).collect()
}

/// Returns true if every point of `a` has a matching point in `b` and the counts agree.
pub fn same_points(a: &[IntersectionResult], b: &[IntersectionResult], eps: f64) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|ra| b.iter().any(|rb| ra.point.fuzzy_eq_eps(rb.point, eps)))
}

pub fn assert_point_eq(actual: Vector2<f64>, expected: Vector2<f64>, eps: f64) {
    assert!(
        actual.fuzzy_eq_eps(expected, eps),
        "points differ: actual {actual:?}, expected {expected:?}"
    );
}

pub fn sorted_by_y(mut results: Vec<IntersectionResult>) -> Vec<IntersectionResult> {
    results.sort_by(|a, b| a.point.y.total_cmp(&b.point.y));
    results
}

pub fn distance(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    (a - b).length()
}

pub fn approx(a: f64, b: f64, eps: f64) -> bool {
    a.fuzzy_eq_eps(b, eps)
}

/// Returns true if every result of `a` has a counterpart in `b` with the same point and
/// parameters (within `eps`) and the counts agree.
pub fn same_results(a: &[IntersectionResult], b: &[IntersectionResult], eps: f64) -> bool {
    a.len() == b.len()
        && a.iter().all(|ra| {
            b.iter().any(|rb| {
                ra.point.fuzzy_eq_eps(rb.point, eps)
                    && ra.param1.fuzzy_eq_eps(rb.param1, eps)
                    && ra.param2.fuzzy_eq_eps(rb.param2, eps)
            })
        })
}

/// Intersections of `b` against `a` with the parameter slots exchanged back.
pub fn swapped_intersections(
    a: &Shape,
    b: &Shape,
    options: &toolpath_geom::intersect::IntersectOptions,
) -> Vec<IntersectionResult> {
    toolpath_geom::intersect::find_shape_intersections(b, a, options)
        .unwrap()
        .into_iter()
        .map(IntersectionResult::swapped)
        .collect()
}
