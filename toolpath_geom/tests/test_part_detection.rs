mod test_utils;

use test_utils::{approx, line, rect_chain};
use toolpath_geom::{
    chain::{detect_chains, Chain},
    core::math::Vector2,
    part::{detect_parts, PartDetectionParameters, PartId, PartWarningKind},
    pline_closed,
    shape::{Ellipse, Shape, Spline},
};

fn params() -> PartDetectionParameters {
    PartDetectionParameters::new()
}

#[test]
fn three_level_nesting() {
    let chains = vec![
        rect_chain("outer", 0.0, 0.0, 100.0, 100.0),
        rect_chain("hole", 10.0, 10.0, 90.0, 90.0),
        rect_chain("island", 30.0, 30.0, 70.0, 70.0),
    ];
    let result = detect_parts(&chains, 1e-3, &params());

    assert_eq!(result.parts.len(), 2);
    assert!(result.warnings.is_empty());
    let roots: Vec<_> = result.root_parts().collect();
    assert_eq!(roots.len(), 1);

    let outer = roots[0];
    assert_eq!(outer.shell.chain_id.as_str(), "outer");
    assert_eq!(outer.nesting_level(), 0);
    assert_eq!(outer.holes.len(), 1);
    assert_eq!(outer.holes[0].chain_id.as_str(), "hole");
    assert_eq!(outer.holes[0].nesting_level, 1);
    assert_eq!(outer.holes[0].nested_parts.len(), 1);

    let island = result.part(outer.holes[0].nested_parts[0]).unwrap();
    assert_eq!(island.shell.chain_id.as_str(), "island");
    assert_eq!(island.nesting_level(), 2);
    assert_eq!(island.parent, Some(outer.id));
    assert!(island.holes.is_empty());
    assert!(approx(island.shell.area, 1600.0, 1e-9));
}

#[test]
fn grid_of_rectangles_with_one_hole() {
    let mut chains = Vec::new();
    for i in 0..3 {
        for j in 0..3 {
            let (x, y) = (i as f64 * 30.0, j as f64 * 30.0);
            chains.push(rect_chain(&format!("r{i}{j}"), x, y, x + 20.0, y + 20.0));
        }
    }
    chains.push(rect_chain("small", 35.0, 35.0, 45.0, 45.0));

    let result = detect_parts(&chains, 1e-3, &params());
    assert_eq!(result.parts.len(), 9);
    assert!(result.warnings.is_empty());

    let with_holes: Vec<_> = result.parts.iter().filter(|p| !p.holes.is_empty()).collect();
    assert_eq!(with_holes.len(), 1);
    assert_eq!(with_holes[0].shell.chain_id.as_str(), "r11");
    assert_eq!(with_holes[0].holes.len(), 1);
    assert_eq!(with_holes[0].holes[0].chain_id.as_str(), "small");

    // parts follow chain order and ids index into the list
    for (n, part) in result.parts.iter().enumerate() {
        assert_eq!(part.id, PartId(n));
    }
    assert_eq!(result.parts[0].shell.chain_id.as_str(), "r00");
}

#[test]
fn circle_with_polyline_hole() {
    let chains = vec![
        Chain::new("disc", vec![Shape::circle("c", Vector2::new(0.0, 0.0), 50.0)]),
        Chain::new(
            "window",
            vec![Shape::polyline(
                "p",
                pline_closed![
                    (-10.0, -10.0, 0.0),
                    (10.0, -10.0, 0.0),
                    (10.0, 10.0, 0.0),
                    (-10.0, 10.0, 0.0)
                ],
            )],
        ),
    ];
    let result = detect_parts(&chains, 1e-3, &params());
    assert_eq!(result.parts.len(), 1);
    let part = &result.parts[0];
    assert_eq!(part.shell.chain_id.as_str(), "disc");
    assert!(approx(part.shell.area, std::f64::consts::PI * 2500.0, 1e-6));
    assert_eq!(part.holes.len(), 1);
    assert!(approx(part.holes[0].area, 400.0, 1e-9));
}

#[test]
fn rounded_slot_inside_ellipse() {
    // slot made of two lines and two half circle arcs, inside a large ellipse
    let slot = Chain::new(
        "slot",
        vec![
            line("bottom", -10.0, -5.0, 10.0, -5.0),
            Shape::arc(
                "right",
                Vector2::new(10.0, 0.0),
                5.0,
                -std::f64::consts::FRAC_PI_2,
                std::f64::consts::FRAC_PI_2,
                false,
            ),
            line("top", 10.0, 5.0, -10.0, 5.0),
            Shape::arc(
                "left",
                Vector2::new(-10.0, 0.0),
                5.0,
                std::f64::consts::FRAC_PI_2,
                -std::f64::consts::FRAC_PI_2,
                false,
            ),
        ],
    );
    let plate = Chain::new(
        "plate",
        vec![Shape::ellipse(
            "e",
            Ellipse::new(Vector2::new(0.0, 0.0), Vector2::new(60.0, 0.0), 0.5),
        )],
    );
    let result = detect_parts(&[slot, plate], 1e-3, &params());
    assert_eq!(result.parts.len(), 1);
    assert_eq!(result.parts[0].shell.chain_id.as_str(), "plate");
    assert_eq!(result.parts[0].holes.len(), 1);
    let hole = &result.parts[0].holes[0];
    assert_eq!(hole.chain_id.as_str(), "slot");
    assert!(approx(hole.area, 200.0 + std::f64::consts::PI * 25.0, 1e-6));
}

#[test]
fn closed_spline_is_a_part() {
    let spline = Spline::new(
        1,
        vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(10.0, 10.0),
            Vector2::new(0.0, 10.0),
            Vector2::new(0.0, 0.0),
        ],
    );
    let chains = vec![Chain::new("s", vec![Shape::spline("s", spline)])];
    let result = detect_parts(&chains, 1e-3, &params());
    assert_eq!(result.parts.len(), 1);
    assert!(approx(result.parts[0].shell.area, 100.0, 1e-6));
}

#[test]
fn gap_larger_than_tolerance_gives_no_parts() {
    let chains = vec![Chain::new(
        "gappy",
        vec![
            line("a", 0.0, 0.0, 10.0, 0.0),
            line("b", 10.0, 0.0, 10.0, 10.0),
            line("c", 10.0, 10.0, 0.0, 10.0),
            line("d", 0.0, 10.0, 0.0, 0.5),
        ],
    )];
    let result = detect_parts(&chains, 1e-3, &params());
    assert!(result.parts.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, PartWarningKind::NoPartsFound);
}

#[test]
fn detected_chains_feed_part_detection() {
    // loose shapes in scrambled order, two rectangles one inside the other
    let mut shapes = test_utils::rect_shapes("in", 2.0, 2.0, 8.0, 8.0);
    shapes.extend(test_utils::rect_shapes("out", 0.0, 0.0, 10.0, 10.0));
    shapes.swap(0, 3);
    shapes.swap(5, 6);
    let chains = detect_chains(&shapes, 1e-3);
    assert_eq!(chains.len(), 2);

    let result = detect_parts(&chains, 1e-3, &params());
    assert_eq!(result.parts.len(), 1);
    assert_eq!(result.parts[0].holes.len(), 1);
    assert!(approx(result.parts[0].shell.area, 100.0, 1e-9));
    assert!(approx(result.parts[0].holes[0].area, 36.0, 1e-9));
    assert!(result.warnings.is_empty());
}
