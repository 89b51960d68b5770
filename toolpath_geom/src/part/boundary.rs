use crate::{
    chain::Chain,
    core::{
        math::{bulge_from_angle, point_on_circle, Vector2},
        traits::Real,
    },
    shape::{Geometry, PlineVertex, Polyline, Shape},
};

/// Closed polyline following `chain`, `None` if it has fewer than two distinct vertexes.
///
/// Lines and polyline segments are copied, arcs become bulge segments of at most a half circle,
/// circles two half circle segments and ellipses and splines `curve_samples` straight segments.
pub(crate) fn chain_boundary<T>(chain: &Chain<T>, curve_samples: usize) -> Option<Polyline<T>>
where
    T: Real,
{
    let mut vertexes = Vec::new();
    for shape in &chain.shapes {
        push_shape(&mut vertexes, shape, curve_samples.max(2));
    }

    // consecutive duplicates (shape joints within tolerance) would give zero length segments
    let mut result: Vec<PlineVertex<T>> = Vec::with_capacity(vertexes.len());
    for v in vertexes {
        match result.last_mut() {
            Some(last) if last.pos().fuzzy_eq(v.pos()) => *last = v,
            _ => result.push(v),
        }
    }
    while result.len() > 1 && result[0].pos().fuzzy_eq(result[result.len() - 1].pos()) {
        result.pop();
    }

    if result.len() < 2 {
        return None;
    }

    Some(Polyline::from_vertexes(result, true))
}

/// Append the vertexes of `shape` leading up to (not including) its end point.
fn push_shape<T>(out: &mut Vec<PlineVertex<T>>, shape: &Shape<T>, curve_samples: usize)
where
    T: Real,
{
    match &shape.geometry {
        Geometry::Line(l) => out.push(PlineVertex::from_vector2(l.start, T::zero())),
        Geometry::Arc(a) => {
            if a.is_degenerate() {
                out.push(PlineVertex::from_vector2(a.start_point(), T::zero()));
                return;
            }
            push_arc(out, a.center, a.radius, a.start_angle, a.sweep_angle());
        }
        Geometry::Circle(c) => {
            if c.is_degenerate() {
                out.push(PlineVertex::from_vector2(c.center, T::zero()));
                return;
            }
            push_arc(out, c.center, c.radius, T::zero(), T::tau());
        }
        Geometry::Polyline(p) => {
            let n = p.vertexes.len();
            let keep = if p.is_closed || n == 1 { n } else { n - 1 };
            out.extend(p.vertexes.iter().take(keep).copied());
        }
        Geometry::Spline(_) | Geometry::Ellipse(_) => {
            let n = T::constant(curve_samples as f64);
            for i in 0..curve_samples {
                let p = shape.point_at_parameter(T::constant(i as f64) / n);
                out.push(PlineVertex::from_vector2(p, T::zero()));
            }
        }
    }
}

/// Arc as bulge segments, each sweeping at most a half circle.
fn push_arc<T>(out: &mut Vec<PlineVertex<T>>, center: Vector2<T>, radius: T, start: T, sweep: T)
where
    T: Real,
{
    let pieces = (sweep.abs() / T::pi()).ceil();
    let count = num_traits::ToPrimitive::to_usize(&pieces).unwrap_or(1).max(1);
    let step = sweep / T::constant(count as f64);
    let bulge = bulge_from_angle(step);
    for i in 0..count {
        let angle = start + step * T::constant(i as f64);
        out.push(PlineVertex::from_vector2(point_on_circle(radius, center, angle), bulge));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Ellipse;
    use std::f64::consts::PI;

    #[test]
    fn circle_boundary_is_two_half_arcs() {
        let chain = Chain::new("c", vec![Shape::circle("c", Vector2::new(1.0, 1.0), 2.0)]);
        let pl = chain_boundary(&chain, 64).unwrap();
        assert_eq!(pl.vertex_count(), 2);
        assert_fuzzy_eq!(pl.vertexes[0].bulge, 1.0);
        assert_fuzzy_eq!(pl.area(), 4.0 * PI);
        assert_eq!(pl.winding_number(Vector2::new(1.0, 1.0)), 1);
    }

    #[test]
    fn clockwise_arc_and_line() {
        // half disc above the x axis traversed clockwise
        let chain = Chain::new(
            "d",
            vec![
                Shape::arc("a", Vector2::new(0.0, 0.0), 1.0, PI, 0.0, true),
                Shape::line("l", Vector2::new(1.0, 0.0), Vector2::new(-1.0, 0.0)),
            ],
        );
        let pl = chain_boundary(&chain, 64).unwrap();
        assert_eq!(pl.vertex_count(), 2);
        assert_fuzzy_eq!(pl.vertexes[0].bulge, -1.0);
        assert_fuzzy_eq!(pl.area(), -PI / 2.0);
        assert_ne!(pl.winding_number(Vector2::new(0.0, 0.5)), 0);
        assert_eq!(pl.winding_number(Vector2::new(0.0, -0.5)), 0);
    }

    #[test]
    fn ellipse_is_sampled() {
        let e = Ellipse::new(Vector2::new(0.0, 0.0), Vector2::new(2.0, 0.0), 0.5);
        let chain = Chain::new("e", vec![Shape::ellipse("e", e)]);
        let pl = chain_boundary(&chain, 32).unwrap();
        assert_eq!(pl.vertex_count(), 32);
        // polygon inscribed in the ellipse, slightly smaller than PI * a * b
        assert!(pl.area() < 2.0 * PI && pl.area() > 0.99 * 2.0 * PI);
    }
}
