mod test_utils;

use std::collections::BTreeSet;

use test_utils::{line, rect_shapes, shape_ids};
use toolpath_geom::{
    chain::{detect_chains, Chain},
    core::math::Vector2,
    pline_open,
    shape::{Ellipse, Shape},
};

fn membership(chains: &[Chain]) -> BTreeSet<BTreeSet<String>> {
    chains
        .iter()
        .map(|c| c.shape_ids().map(|id| id.as_str().to_owned()).collect())
        .collect()
}

#[test]
fn empty_input() {
    assert!(detect_chains::<f64>(&[], 1e-3).is_empty());
}

#[test]
fn separate_rectangles() {
    let mut shapes = rect_shapes("a", 0.0, 0.0, 10.0, 10.0);
    shapes.extend(rect_shapes("b", 20.0, 0.0, 30.0, 10.0));
    let chains = detect_chains(&shapes, 1e-3);
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].id.as_str(), "chain-1");
    assert_eq!(chains[1].id.as_str(), "chain-2");
    assert_eq!(shape_ids(&chains[0]), ["a-0", "a-1", "a-2", "a-3"]);
    assert_eq!(shape_ids(&chains[1]), ["b-0", "b-1", "b-2", "b-3"]);
    assert!(chains.iter().all(|c| c.is_closed(1e-3)));
}

#[test]
fn gap_within_tolerance_connects() {
    let shapes = vec![
        line("a", 0.0, 0.0, 10.0, 0.0),
        line("b", 10.0005, 0.0, 20.0, 0.0),
    ];
    assert_eq!(detect_chains(&shapes, 1e-3).len(), 1);
    assert_eq!(detect_chains(&shapes, 1e-4).len(), 2);
}

#[test]
fn mixed_kinds_connect_through_end_points() {
    let shapes = vec![
        Shape::arc("arc", Vector2::new(0.0, 0.0), 5.0, 0.0, std::f64::consts::PI, false),
        line("line", -5.0, 0.0, -5.0, -10.0),
        Shape::polyline(
            "pline",
            pline_open![(-5.0, -10.0, 0.0), (5.0, -10.0, 0.5), (5.0, 0.0, 0.0)],
        ),
        Shape::ellipse(
            "lonely",
            Ellipse::new(Vector2::new(100.0, 100.0), Vector2::new(4.0, 0.0), 0.5),
        ),
    ];
    let chains = detect_chains(&shapes, 1e-6);
    assert_eq!(chains.len(), 2);
    assert_eq!(shape_ids(&chains[0]), ["arc", "line", "pline"]);
    assert_eq!(shape_ids(&chains[1]), ["lonely"]);
}

#[test]
fn polyline_interior_vertex_connects() {
    let shapes = vec![
        Shape::polyline("p", pline_open![(0.0, 0.0, 0.0), (5.0, 0.0, 0.0), (10.0, 0.0, 0.0)]),
        line("spur", 5.0, 0.0, 5.0, 5.0),
    ];
    assert_eq!(detect_chains(&shapes, 1e-6).len(), 1);
}

#[test]
fn repeated_runs_are_identical() {
    let mut shapes = rect_shapes("r", 0.0, 0.0, 10.0, 10.0);
    shapes.push(line("x", 50.0, 50.0, 60.0, 60.0));
    shapes.push(Shape::circle("c", Vector2::new(-20.0, 0.0), 3.0));
    let first = detect_chains(&shapes, 1e-3);
    let second = detect_chains(&shapes, 1e-3);
    assert_eq!(first, second);
}

#[test]
fn membership_does_not_depend_on_input_order() {
    let mut shapes = rect_shapes("r", 0.0, 0.0, 10.0, 10.0);
    shapes.extend(rect_shapes("s", 10.0, 0.0, 20.0, 10.0));
    shapes.push(line("x", 50.0, 50.0, 60.0, 60.0));
    shapes.push(line("y", 60.0, 60.0, 70.0, 50.0));

    let forward = detect_chains(&shapes, 1e-3);
    shapes.reverse();
    let backward = detect_chains(&shapes, 1e-3);

    assert_eq!(forward.len(), 2);
    assert_eq!(membership(&forward), membership(&backward));
    // shared edge end points join both rectangles
    assert_eq!(forward[0].len(), 8);
}

#[test]
fn non_finite_shape_stays_alone() {
    let mut shapes = rect_shapes("r", 2.0, 2.0, 6.0, 6.0);
    shapes.push(line("nan", f64::NAN, 0.0, 20.0, 20.0));
    let chains = detect_chains(&shapes, 1e-6);
    assert_eq!(chains.len(), 2);
    assert_eq!(shape_ids(&chains[0]), ["r-0", "r-1", "r-2", "r-3"]);
    assert_eq!(shape_ids(&chains[1]), ["nan"]);
}
