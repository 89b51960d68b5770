//! Sampled curve/curve intersection with Newton refinement.
//!
//! Both curves are sampled into chords, crossing chords (found through a spatial index) seed a
//! two variable Newton iteration on `A(s) - B(t) = 0`.

use super::{
    piece::ParamCurve, IntersectionResult, IntersectionType, APPROXIMATE_CONFIDENCE,
    CONVERGED_CONFIDENCE,
};
use crate::{
    core::{
        math::{clamp_unit, line_line_intr, midpoint, parametric_from_point, LineLineIntr, Vector2},
        traits::Real,
    },
    shape::extents,
};

/// Residual distance at which a Newton refinement counts as converged.
pub const NUMERIC_TOLERANCE: f64 = 1e-9;

const MAX_NEWTON_ITERATIONS: usize = 20;

/// Seed for the Newton iteration: local parameters and the chord crossing point.
#[derive(Debug, Copy, Clone)]
struct Seed<T> {
    s: T,
    t: T,
    point: Vector2<T>,
}

fn sample<T, C>(curve: &C) -> Result<Vec<Vector2<T>>, String>
where
    T: Real,
    C: ParamCurve<T>,
{
    let n = curve.sample_count().max(1);
    let nf = T::constant(n as f64);
    let points: Vec<_> = (0..=n)
        .map(|i| curve.eval(T::constant(i as f64) / nf))
        .collect();
    if points.iter().any(|p| !p.is_finite()) {
        return Err("curve evaluation produced non-finite points".to_string());
    }
    Ok(points)
}

fn chord_seeds<T>(pts_a: &[Vector2<T>], pts_b: &[Vector2<T>], tol: T) -> Vec<Seed<T>>
where
    T: Real,
{
    let na = T::constant((pts_a.len() - 1) as f64);
    let nb = T::constant((pts_b.len() - 1) as f64);

    let boxes_b: Vec<_> = pts_b
        .windows(2)
        .map(|w| {
            let bb = extents::include_point(&extents::point_extents(w[0]), w[1]);
            extents::expanded(&bb, tol)
        })
        .collect();
    let index = extents::build_index(&boxes_b);

    let mut seeds = Vec::new();
    for (i, wa) in pts_a.windows(2).enumerate() {
        let bb = extents::include_point(&extents::point_extents(wa[0]), wa[1]);
        let mut hits = index.query(bb.min_x - tol, bb.min_y - tol, bb.max_x + tol, bb.max_y + tol);
        hits.sort_unstable();
        let fi = T::constant(i as f64);
        for j in hits {
            let wb = &pts_b[j..j + 2];
            let fj = T::constant(j as f64);
            match line_line_intr(wa[0], wa[1], wb[0], wb[1], tol) {
                LineLineIntr::TrueIntersect { seg1_t, seg2_t } => seeds.push(Seed {
                    s: (fi + clamp_unit(seg1_t)) / na,
                    t: (fj + clamp_unit(seg2_t)) / nb,
                    point: wa[0] + (wa[1] - wa[0]).scale(seg1_t),
                }),
                LineLineIntr::Overlapping { seg2_t0, seg2_t1 } => {
                    for t2 in [seg2_t0, seg2_t1] {
                        let point = wb[0] + (wb[1] - wb[0]).scale(t2);
                        let t1 = parametric_from_point(wa[0], wa[1], point, tol);
                        seeds.push(Seed {
                            s: (fi + clamp_unit(t1)) / na,
                            t: (fj + clamp_unit(t2)) / nb,
                            point,
                        });
                    }
                }
                LineLineIntr::NoIntersect | LineLineIntr::FalseIntersect { .. } => {}
            }
        }
    }

    seeds
}

/// Newton iteration from `seed`, returns refined `(s, t, residual)`.
fn refine<T, A, B>(a: &A, b: &B, seed: Seed<T>) -> Result<(T, T, T), String>
where
    T: Real,
    A: ParamCurve<T>,
    B: ParamCurve<T>,
{
    let target = T::constant(NUMERIC_TOLERANCE);
    let mut s = seed.s;
    let mut t = seed.t;
    let mut residual = (a.eval(s) - b.eval(t)).length();

    for _ in 0..MAX_NEWTON_ITERATIONS {
        if residual <= target {
            break;
        }

        let f = a.eval(s) - b.eval(t);
        let c1 = a.derivative(s);
        let c2 = -b.derivative(t);
        let det = c1.perp_dot(c2);
        if det.fuzzy_eq_zero_eps(T::constant(1e-14)) {
            // parallel tangents, no unique step
            break;
        }

        let rhs = -f;
        let ds = rhs.perp_dot(c2) / det;
        let dt = c1.perp_dot(rhs) / det;
        let next_s = clamp_unit(s + ds);
        let next_t = clamp_unit(t + dt);
        let next_residual = (a.eval(next_s) - b.eval(next_t)).length();
        if !next_residual.is_finite() || !ds.is_finite() || !dt.is_finite() {
            return Err(format!(
                "newton step produced non-finite values at s = {s:?}, t = {t:?}"
            ));
        }

        s = next_s;
        t = next_t;
        residual = next_residual;
    }

    Ok((s, t, residual))
}

/// Intersect two parametric curves, parameters in the results are local to each curve.
///
/// Converged results are [IntersectionType::True], seeds that fail to converge are kept as
/// [IntersectionType::Approximate] at the best point found. `Err` carries a reason when
/// evaluation or refinement becomes non-finite.
pub(crate) fn curve_curve<T, A, B>(
    a: &A,
    b: &B,
    tol: T,
) -> Result<Vec<IntersectionResult<T>>, String>
where
    T: Real,
    A: ParamCurve<T>,
    B: ParamCurve<T>,
{
    let pts_a = sample(a)?;
    let pts_b = sample(b)?;
    let target = T::constant(NUMERIC_TOLERANCE);

    let mut results = Vec::new();
    for seed in chord_seeds(&pts_a, &pts_b, tol) {
        let (s, t, residual) = refine(a, b, seed)?;
        let pa = a.eval(s);
        let pb = b.eval(t);
        let result = if residual <= target {
            IntersectionResult {
                point: midpoint(pa, pb),
                param1: s,
                param2: t,
                confidence: T::constant(CONVERGED_CONFIDENCE),
                intersection_type: IntersectionType::True,
                on_extension: false,
            }
        } else if residual <= tol {
            IntersectionResult {
                point: midpoint(pa, pb),
                param1: s,
                param2: t,
                confidence: T::constant(APPROXIMATE_CONFIDENCE),
                intersection_type: IntersectionType::Approximate,
                on_extension: false,
            }
        } else {
            IntersectionResult {
                point: seed.point,
                param1: seed.s,
                param2: seed.t,
                confidence: T::constant(APPROXIMATE_CONFIDENCE),
                intersection_type: IntersectionType::Approximate,
                on_extension: false,
            }
        };
        results.push(result);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersect::piece::Piece;
    use crate::shape::{Arc, Ellipse, Line};
    use std::f64::consts::PI;

    #[test]
    fn ellipse_and_circle_converge() {
        let e = Piece::Ellipse(Ellipse::new(
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            0.5,
        ));
        let c = Piece::Arc(Arc::new(Vector2::new(0.0, 0.0), 3.0, 0.0, 2.0 * PI, false));
        let results = curve_curve(&e, &c, 1e-6).unwrap();
        let mut pts: Vec<_> = results
            .iter()
            .filter(|r| r.intersection_type == IntersectionType::True)
            .map(|r| r.point)
            .collect();
        assert!(!pts.is_empty());
        for p in pts.drain(..) {
            assert_fuzzy_eq!(p.length(), 3.0, 1e-7);
            // on the ellipse: (x/4)^2 + (y/2)^2 = 1
            assert_fuzzy_eq!((p.x / 4.0).powi(2) + (p.y / 2.0).powi(2), 1.0, 1e-7);
        }
    }

    #[test]
    fn line_crossing_refines_exactly() {
        let a = Piece::Line(Line::new(Vector2::new(0.5, 0.0), Vector2::new(0.5, 2.0)));
        let e = Piece::Ellipse(Ellipse::new(
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            0.5,
        ));
        let results = super::super::cluster_results(curve_curve(&a, &e, 1e-6).unwrap(), 1e-6);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].intersection_type, IntersectionType::True);
        let y = 0.9375f64.sqrt();
        assert_fuzzy_eq!(results[0].point, Vector2::new(0.5, y), 1e-8);
        assert_fuzzy_eq!(results[0].param1, y / 2.0, 1e-8);
    }

    #[test]
    fn disjoint_curves_have_no_results() {
        let a = Piece::Line(Line::new(Vector2::new(10.0, 10.0), Vector2::new(11.0, 11.0)));
        let e = Piece::Ellipse(Ellipse::new(
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            0.5,
        ));
        assert!(curve_curve(&a, &e, 1e-6).unwrap().is_empty());
    }
}
