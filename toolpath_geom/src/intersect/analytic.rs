//! Closed form solvers for line, arc and ellipse pieces.
//!
//! All functions return results with piece local parameters, the caller maps them onto shape
//! parameters.

use super::{
    piece::Reach, IntersectionResult, IntersectionType, EXACT_CONFIDENCE, EXTENSION_CONFIDENCE,
    TANGENT_CONFIDENCE,
};
use crate::{
    core::{
        math::{
            angle, circle_circle_intr, directed_angle_from, line_circle_intr, line_line_intr,
            normalize_radians, parametric_from_point, point_from_parametric, CircleCircleIntr,
            LineCircleIntr, LineLineIntr, Vector2,
        },
        traits::Real,
    },
    shape::{Arc, Ellipse, Line},
};

/// Location of a point on a piece: local parameter and whether it lies on an extension.
type Placement<T> = (T, bool);

/// Accept parametric `t` on `line` if it is on the segment or within the allowed reach.
fn place_on_line<T>(line: &Line<T>, reach: Reach<T>, t: T, tol: T) -> Option<Placement<T>>
where
    T: Real,
{
    let len = line.length();
    if !(len > T::zero()) {
        return Some((T::zero(), false));
    }

    let s = t * len;
    if s >= -tol && s <= len + tol {
        return Some((t, false));
    }

    if s < T::zero() && -s <= reach.start + tol && reach.start > T::zero() {
        return Some((t, true));
    }

    if s > len && s - len <= reach.end + tol && reach.end > T::zero() {
        return Some((t, true));
    }

    None
}

/// Accept `point` (assumed on the arc's circle) if it is within the sweep or the allowed reach.
fn place_on_arc<T>(arc: &Arc<T>, reach: Reach<T>, point: Vector2<T>, tol: T) -> Option<Placement<T>>
where
    T: Real,
{
    let sweep = arc.sweep_angle();
    let abs_sweep = sweep.abs();
    if !(abs_sweep > T::zero()) || !(arc.radius > T::zero()) {
        return None;
    }

    let r = arc.radius;
    let travel = directed_angle_from(arc.start_angle, angle(arc.center, point), sweep).abs();
    let along = travel * r;
    let arc_len = abs_sweep * r;
    if along <= arc_len + tol {
        let t = num_traits::real::Real::min(travel / abs_sweep, T::one());
        return Some((t, false));
    }

    let before_start = (T::tau() - travel) * r;
    if before_start <= tol {
        return Some((T::zero(), false));
    }

    if reach.end > T::zero() && along - arc_len <= reach.end + tol {
        return Some((travel / abs_sweep, true));
    }

    if reach.start > T::zero() && before_start <= reach.start + tol {
        return Some((-(T::tau() - travel) / abs_sweep, true));
    }

    None
}

fn make_result<T>(
    point: Vector2<T>,
    a: Placement<T>,
    b: Placement<T>,
    tangent: bool,
) -> IntersectionResult<T>
where
    T: Real,
{
    let on_extension = a.1 || b.1;
    let (confidence, intersection_type) = if on_extension {
        (EXTENSION_CONFIDENCE, IntersectionType::Infinite)
    } else if tangent {
        (TANGENT_CONFIDENCE, IntersectionType::True)
    } else {
        (EXACT_CONFIDENCE, IntersectionType::True)
    };

    IntersectionResult {
        point,
        param1: a.0,
        param2: b.0,
        confidence: T::constant(confidence),
        intersection_type,
        on_extension,
    }
}

pub(crate) fn line_line<T>(
    a: &Line<T>,
    reach_a: Reach<T>,
    b: &Line<T>,
    reach_b: Reach<T>,
    tol: T,
) -> Vec<IntersectionResult<T>>
where
    T: Real,
{
    let mut results = Vec::new();
    match line_line_intr(a.start, a.end, b.start, b.end, tol) {
        LineLineIntr::NoIntersect => {}
        LineLineIntr::TrueIntersect { seg1_t, seg2_t }
        | LineLineIntr::FalseIntersect { seg1_t, seg2_t } => {
            let pa = place_on_line(a, reach_a, seg1_t, tol);
            let pb = place_on_line(b, reach_b, seg2_t, tol);
            if let (Some(pa), Some(pb)) = (pa, pb) {
                let point = point_from_parametric(a.start, a.end, seg1_t);
                results.push(make_result(point, pa, pb, false));
            }
        }
        LineLineIntr::Overlapping { seg2_t0, seg2_t1 } => {
            // collinear overlap, report both ends of the shared span
            for t2 in [seg2_t0, seg2_t1] {
                let point = point_from_parametric(b.start, b.end, t2);
                let t1 = parametric_from_point(a.start, a.end, point, tol);
                results.push(make_result(point, (t1, false), (t2, false), false));
            }
        }
    }

    results
}

pub(crate) fn line_arc<T>(
    line: &Line<T>,
    reach_line: Reach<T>,
    arc: &Arc<T>,
    reach_arc: Reach<T>,
    tol: T,
) -> Vec<IntersectionResult<T>>
where
    T: Real,
{
    let mut results = Vec::new();
    let mut try_t = |t: T, tangent: bool| {
        let point = point_from_parametric(line.start, line.end, t);
        let pl = place_on_line(line, reach_line, t, tol);
        let pa = place_on_arc(arc, reach_arc, point, tol);
        if let (Some(pl), Some(pa)) = (pl, pa) {
            results.push(make_result(point, pl, pa, tangent));
        }
    };

    match line_circle_intr(line.start, line.end, arc.radius, arc.center, tol) {
        LineCircleIntr::NoIntersect => {}
        LineCircleIntr::TangentIntersect { t0 } => try_t(t0, true),
        LineCircleIntr::TwoIntersects { t0, t1 } => {
            try_t(t0, false);
            try_t(t1, false);
        }
    }

    results
}

pub(crate) fn arc_arc<T>(
    a: &Arc<T>,
    reach_a: Reach<T>,
    b: &Arc<T>,
    reach_b: Reach<T>,
    tol: T,
) -> Vec<IntersectionResult<T>>
where
    T: Real,
{
    let mut results = Vec::new();
    let mut try_point = |point: Vector2<T>, tangent: bool| {
        let pa = place_on_arc(a, reach_a, point, tol);
        let pb = place_on_arc(b, reach_b, point, tol);
        if let (Some(pa), Some(pb)) = (pa, pb) {
            results.push(make_result(point, pa, pb, tangent));
        }
    };

    match circle_circle_intr(a.radius, a.center, b.radius, b.center, tol) {
        CircleCircleIntr::NoIntersect => {}
        CircleCircleIntr::TangentIntersect { point } => try_point(point, true),
        CircleCircleIntr::TwoIntersects { point1, point2 } => {
            try_point(point1, false);
            try_point(point2, false);
        }
        CircleCircleIntr::Overlapping => {
            // same circle, the overlap ends are arc end points lying on the other arc
            for p in [a.start_point(), a.end_point(), b.start_point(), b.end_point()] {
                let pa = place_on_arc(a, Reach::none(), p, tol);
                let pb = place_on_arc(b, Reach::none(), p, tol);
                if let (Some(pa), Some(pb)) = (pa, pb) {
                    results.push(make_result(p, pa, pb, false));
                }
            }
        }
    }

    results
}

/// Line against ellipse, solved by mapping the line into the frame where the ellipse is the unit
/// circle (parametric values survive the affine map).
pub(crate) fn line_ellipse<T>(
    line: &Line<T>,
    reach_line: Reach<T>,
    ellipse: &Ellipse<T>,
    tol: T,
) -> Vec<IntersectionResult<T>>
where
    T: Real,
{
    let mut results = Vec::new();
    if ellipse.is_degenerate() || ellipse.minor_radius().fuzzy_eq_zero() {
        return results;
    }

    let a = ellipse.major_radius();
    let b = ellipse.minor_radius();
    let (u, v) = ellipse.axes();
    let to_unit = |p: Vector2<T>| {
        let d = p - ellipse.center;
        Vector2::new(d.dot(u) / a, d.dot(v) / b)
    };

    let p0 = to_unit(line.start);
    let p1 = to_unit(line.end);
    let unit_tol = tol / b;
    let (start_param, sweep) = ellipse.param_range();
    let param_tol = tol / a;

    let mut try_t = |t: T, tangent: bool| {
        let pl = match place_on_line(line, reach_line, t, tol) {
            Some(pl) => pl,
            None => return,
        };

        let unit_point = point_from_parametric(p0, p1, t);
        let param = T::atan2(unit_point.y, unit_point.x);
        let d = normalize_radians(param - start_param);
        let local = if d <= sweep + param_tol {
            num_traits::real::Real::min(d / sweep, T::one())
        } else if T::tau() - d <= param_tol {
            T::zero()
        } else {
            return;
        };

        let point = point_from_parametric(line.start, line.end, t);
        results.push(make_result(point, pl, (local, false), tangent));
    };

    match line_circle_intr(p0, p1, T::one(), Vector2::zero(), unit_tol) {
        LineCircleIntr::NoIntersect => {}
        LineCircleIntr::TangentIntersect { t0 } => try_t(t0, true),
        LineCircleIntr::TwoIntersects { t0, t1 } => {
            try_t(t0, false);
            try_t(t1, false);
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn line_extension_hit() {
        let a = Line::new(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0));
        let b = Line::new(Vector2::new(12.0, -5.0), Vector2::new(12.0, 5.0));
        assert!(line_line(&a, Reach::none(), &b, Reach::none(), 1e-9).is_empty());

        let reach = Reach {
            start: 0.0,
            end: 3.0,
        };
        let r = line_line(&a, reach, &b, Reach::none(), 1e-9);
        assert_eq!(r.len(), 1);
        assert!(r[0].on_extension);
        assert_eq!(r[0].intersection_type, IntersectionType::Infinite);
        assert_fuzzy_eq!(r[0].param1, 1.2);
        assert_fuzzy_eq!(r[0].point, Vector2::new(12.0, 0.0));
    }

    #[test]
    fn clockwise_arc_sweep_filter() {
        // clockwise quarter arc from (0, 1) to (1, 0)
        let arc = Arc::new(Vector2::new(0.0, 0.0), 1.0, PI / 2.0, 0.0, true);
        let diag = Line::new(Vector2::new(0.0, 0.0), Vector2::new(2.0, 2.0));
        let r = line_arc(&diag, Reach::none(), &arc, Reach::none(), 1e-9);
        assert_eq!(r.len(), 1);
        assert_fuzzy_eq!(r[0].param2, 0.5);

        let other = Line::new(Vector2::new(0.0, 0.0), Vector2::new(-2.0, -2.0));
        assert!(line_arc(&other, Reach::none(), &arc, Reach::none(), 1e-9).is_empty());
    }

    #[test]
    fn arc_extension_before_start() {
        let arc = Arc::new(Vector2::new(0.0, 0.0), 1.0, 0.0, PI / 2.0, false);
        // vertical line through x = cos(-0.1) crosses the circle just below the start
        let x = (-0.1f64).cos();
        let line = Line::new(Vector2::new(x, -1.0), Vector2::new(x, -0.05));
        assert!(line_arc(&line, Reach::none(), &arc, Reach::none(), 1e-9).is_empty());
        let reach = Reach {
            start: 0.2,
            end: 0.0,
        };
        let r = line_arc(&line, Reach::none(), &arc, reach, 1e-9);
        assert_eq!(r.len(), 1);
        assert!(r[0].on_extension);
        assert_fuzzy_eq!(r[0].param2, -0.1 / (PI / 2.0), 1e-9);
    }

    #[test]
    fn overlapping_arcs_report_shared_span_ends() {
        let a = Arc::new(Vector2::new(0.0, 0.0), 1.0, 0.0, PI, false);
        let b = Arc::new(Vector2::new(0.0, 0.0), 1.0, PI / 2.0, 3.0 * PI / 2.0, false);
        let r = arc_arc(&a, Reach::none(), &b, Reach::none(), 1e-9);
        assert_eq!(r.len(), 2);
        assert!(r.iter().any(|x| x.point.fuzzy_eq(Vector2::new(-1.0, 0.0))));
        assert!(r.iter().any(|x| x.point.fuzzy_eq(Vector2::new(0.0, 1.0))));
    }

    #[test]
    fn line_through_rotated_ellipse() {
        let e: Ellipse<f64> = Ellipse::new(Vector2::new(0.0, 0.0), Vector2::new(0.0, 4.0), 0.5);
        let line = Line::new(Vector2::new(-5.0, 0.0), Vector2::new(5.0, 0.0));
        let r = line_ellipse(&line, Reach::none(), &e, 1e-9);
        assert_eq!(r.len(), 2);
        for x in &r {
            assert_fuzzy_eq!(x.point.x.abs(), 2.0);
            assert_fuzzy_eq!(e.point_at(x.param2), x.point);
        }
    }
}
