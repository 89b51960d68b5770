//! One routine per unordered [ShapeKind] pair.
//!
//! Every routine takes its two shapes in canonical kind order, breaks them into [ShapePiece]s
//! and hands the piece pairs to [PairSolver]. Circles are reduced to full sweep arcs that may not
//! be extended.

use static_aabb2d_index::AABB;

use super::{
    analytic, numeric,
    piece::{polyline_pieces, Piece, ShapePiece},
    IntersectOptions, IntersectionResult,
};
use crate::{
    core::traits::Real,
    error::IntersectError,
    shape::{extents, Arc, Circle, Ellipse, Geometry, Line, Polyline, Shape, ShapeKind, Spline},
};

/// Name of the routine handling the canonical pair `(lo, hi)`, `None` if the pair is not in
/// canonical order.
pub(crate) fn routine_name(lo: ShapeKind, hi: ShapeKind) -> Option<&'static str> {
    use ShapeKind::*;
    let name = match (lo, hi) {
        (Arc, Arc) => "arc_arc",
        (Arc, Circle) => "arc_circle",
        (Arc, Ellipse) => "arc_ellipse",
        (Arc, Line) => "arc_line",
        (Arc, Polyline) => "arc_polyline",
        (Arc, Spline) => "arc_spline",
        (Circle, Circle) => "circle_circle",
        (Circle, Ellipse) => "circle_ellipse",
        (Circle, Line) => "circle_line",
        (Circle, Polyline) => "circle_polyline",
        (Circle, Spline) => "circle_spline",
        (Ellipse, Ellipse) => "ellipse_ellipse",
        (Ellipse, Line) => "ellipse_line",
        (Ellipse, Polyline) => "ellipse_polyline",
        (Ellipse, Spline) => "ellipse_spline",
        (Line, Line) => "line_line",
        (Line, Polyline) => "line_polyline",
        (Line, Spline) => "line_spline",
        (Polyline, Polyline) => "polyline_polyline",
        (Polyline, Spline) => "polyline_spline",
        (Spline, Spline) => "spline_spline",
        _ => return None,
    };
    Some(name)
}

/// Run the routine for `first` and `second`, which must already be in canonical kind order.
/// `param1` of each result is on `first`.
pub(crate) fn dispatch<T>(
    first: &Shape<T>,
    second: &Shape<T>,
    options: &IntersectOptions<T>,
) -> Result<Vec<IntersectionResult<T>>, IntersectError>
where
    T: Real,
{
    let solver = PairSolver {
        first,
        second,
        tol: options.tolerance,
        extension: options.effective_extension(),
    };

    use Geometry as G;
    match (&first.geometry, &second.geometry) {
        (G::Arc(a), G::Arc(b)) => arc_arc(&solver, a, b),
        (G::Arc(a), G::Circle(b)) => arc_circle(&solver, a, b),
        (G::Arc(a), G::Ellipse(b)) => arc_ellipse(&solver, a, b),
        (G::Arc(a), G::Line(b)) => arc_line(&solver, a, b),
        (G::Arc(a), G::Polyline(b)) => arc_polyline(&solver, a, b),
        (G::Arc(a), G::Spline(b)) => arc_spline(&solver, a, b),
        (G::Circle(a), G::Circle(b)) => circle_circle(&solver, a, b),
        (G::Circle(a), G::Ellipse(b)) => circle_ellipse(&solver, a, b),
        (G::Circle(a), G::Line(b)) => circle_line(&solver, a, b),
        (G::Circle(a), G::Polyline(b)) => circle_polyline(&solver, a, b),
        (G::Circle(a), G::Spline(b)) => circle_spline(&solver, a, b),
        (G::Ellipse(a), G::Ellipse(b)) => ellipse_ellipse(&solver, a, b),
        (G::Ellipse(a), G::Line(b)) => ellipse_line(&solver, a, b),
        (G::Ellipse(a), G::Polyline(b)) => ellipse_polyline(&solver, a, b),
        (G::Ellipse(a), G::Spline(b)) => ellipse_spline(&solver, a, b),
        (G::Line(a), G::Line(b)) => line_line(&solver, a, b),
        (G::Line(a), G::Polyline(b)) => line_polyline(&solver, a, b),
        (G::Line(a), G::Spline(b)) => line_spline(&solver, a, b),
        (G::Polyline(a), G::Polyline(b)) => polyline_polyline(&solver, a, b),
        (G::Polyline(a), G::Spline(b)) => polyline_spline(&solver, a, b),
        (G::Spline(a), G::Spline(b)) => spline_spline(&solver, a, b),
        // non canonical order, no routine
        _ => Ok(Vec::new()),
    }
}

type PairResult<T> = Result<Vec<IntersectionResult<T>>, IntersectError>;

fn arc_arc<T: Real>(s: &PairSolver<T>, a: &Arc<T>, b: &Arc<T>) -> PairResult<T> {
    s.solve(&arc_pieces(a), &arc_pieces(b))
}

fn arc_circle<T: Real>(s: &PairSolver<T>, a: &Arc<T>, b: &Circle<T>) -> PairResult<T> {
    s.solve(&arc_pieces(a), &circle_pieces(b))
}

fn arc_ellipse<T: Real>(s: &PairSolver<T>, a: &Arc<T>, b: &Ellipse<T>) -> PairResult<T> {
    s.solve(&arc_pieces(a), &ellipse_pieces(b))
}

fn arc_line<T: Real>(s: &PairSolver<T>, a: &Arc<T>, b: &Line<T>) -> PairResult<T> {
    s.solve(&arc_pieces(a), &line_pieces(b))
}

fn arc_polyline<T: Real>(s: &PairSolver<T>, a: &Arc<T>, b: &Polyline<T>) -> PairResult<T> {
    s.solve(&arc_pieces(a), &polyline_pieces(b))
}

fn arc_spline<T: Real>(s: &PairSolver<T>, a: &Arc<T>, b: &Spline<T>) -> PairResult<T> {
    s.solve(&arc_pieces(a), &s.spline_pieces(b, s.second)?)
}

fn circle_circle<T: Real>(s: &PairSolver<T>, a: &Circle<T>, b: &Circle<T>) -> PairResult<T> {
    s.solve(&circle_pieces(a), &circle_pieces(b))
}

fn circle_ellipse<T: Real>(s: &PairSolver<T>, a: &Circle<T>, b: &Ellipse<T>) -> PairResult<T> {
    s.solve(&circle_pieces(a), &ellipse_pieces(b))
}

fn circle_line<T: Real>(s: &PairSolver<T>, a: &Circle<T>, b: &Line<T>) -> PairResult<T> {
    s.solve(&circle_pieces(a), &line_pieces(b))
}

fn circle_polyline<T: Real>(s: &PairSolver<T>, a: &Circle<T>, b: &Polyline<T>) -> PairResult<T> {
    s.solve(&circle_pieces(a), &polyline_pieces(b))
}

fn circle_spline<T: Real>(s: &PairSolver<T>, a: &Circle<T>, b: &Spline<T>) -> PairResult<T> {
    s.solve(&circle_pieces(a), &s.spline_pieces(b, s.second)?)
}

fn ellipse_ellipse<T: Real>(s: &PairSolver<T>, a: &Ellipse<T>, b: &Ellipse<T>) -> PairResult<T> {
    s.solve(&ellipse_pieces(a), &ellipse_pieces(b))
}

fn ellipse_line<T: Real>(s: &PairSolver<T>, a: &Ellipse<T>, b: &Line<T>) -> PairResult<T> {
    s.solve(&ellipse_pieces(a), &line_pieces(b))
}

fn ellipse_polyline<T: Real>(s: &PairSolver<T>, a: &Ellipse<T>, b: &Polyline<T>) -> PairResult<T> {
    s.solve(&ellipse_pieces(a), &polyline_pieces(b))
}

fn ellipse_spline<T: Real>(s: &PairSolver<T>, a: &Ellipse<T>, b: &Spline<T>) -> PairResult<T> {
    s.solve(&ellipse_pieces(a), &s.spline_pieces(b, s.second)?)
}

fn line_line<T: Real>(s: &PairSolver<T>, a: &Line<T>, b: &Line<T>) -> PairResult<T> {
    s.solve(&line_pieces(a), &line_pieces(b))
}

fn line_polyline<T: Real>(s: &PairSolver<T>, a: &Line<T>, b: &Polyline<T>) -> PairResult<T> {
    s.solve(&line_pieces(a), &polyline_pieces(b))
}

fn line_spline<T: Real>(s: &PairSolver<T>, a: &Line<T>, b: &Spline<T>) -> PairResult<T> {
    s.solve(&line_pieces(a), &s.spline_pieces(b, s.second)?)
}

fn polyline_polyline<T: Real>(
    s: &PairSolver<T>,
    a: &Polyline<T>,
    b: &Polyline<T>,
) -> PairResult<T> {
    s.solve(&polyline_pieces(a), &polyline_pieces(b))
}

fn polyline_spline<T: Real>(s: &PairSolver<T>, a: &Polyline<T>, b: &Spline<T>) -> PairResult<T> {
    s.solve(&polyline_pieces(a), &s.spline_pieces(b, s.second)?)
}

fn spline_spline<T: Real>(s: &PairSolver<T>, a: &Spline<T>, b: &Spline<T>) -> PairResult<T> {
    s.solve(&s.spline_pieces(a, s.first)?, &s.spline_pieces(b, s.second)?)
}

fn line_pieces<T: Real>(line: &Line<T>) -> Vec<ShapePiece<T>> {
    if line.length() > T::zero() {
        vec![ShapePiece::whole(Piece::Line(*line), true)]
    } else {
        Vec::new()
    }
}

fn arc_pieces<T: Real>(arc: &Arc<T>) -> Vec<ShapePiece<T>> {
    if arc.is_degenerate() {
        Vec::new()
    } else {
        vec![ShapePiece::whole(Piece::Arc(*arc), true)]
    }
}

fn circle_pieces<T: Real>(circle: &Circle<T>) -> Vec<ShapePiece<T>> {
    if circle.is_degenerate() {
        Vec::new()
    } else {
        vec![ShapePiece::whole(Piece::Arc(circle.to_arc()), false)]
    }
}

fn ellipse_pieces<T: Real>(ellipse: &Ellipse<T>) -> Vec<ShapePiece<T>> {
    if ellipse.is_degenerate() || ellipse.minor_radius().fuzzy_eq_zero() {
        Vec::new()
    } else {
        vec![ShapePiece::whole(Piece::Ellipse(*ellipse), false)]
    }
}

/// Conservative extents of a piece, `None` when they are not cheap to bound.
fn piece_extents<T: Real>(piece: &Piece<T>) -> Option<AABB<T>> {
    match piece {
        Piece::Line(l) => Some(l.bounding_box()),
        Piece::Arc(a) => Some(a.bounding_box()),
        Piece::Ellipse(e) => Some(e.bounding_box()),
        Piece::Nurbs(_) => None,
    }
}

fn extents_overlap<T: Real>(a: &AABB<T>, b: &AABB<T>) -> bool {
    a.min_x <= b.max_x && b.min_x <= a.max_x && a.min_y <= b.max_y && b.min_y <= a.max_y
}

/// Shared state of one pair solve.
struct PairSolver<'a, T: Real> {
    first: &'a Shape<T>,
    second: &'a Shape<T>,
    tol: T,
    extension: T,
}

impl<'a, T> PairSolver<'a, T>
where
    T: Real,
{
    fn spline_pieces(
        &self,
        spline: &Spline<T>,
        owner: &Shape<T>,
    ) -> Result<Vec<ShapePiece<T>>, IntersectError> {
        let nurbs = spline
            .to_nurbs()
            .map_err(|source| IntersectError::InvalidSpline {
                shape_id: owner.id.clone(),
                source,
            })?;
        Ok(vec![ShapePiece::spline(nurbs)])
    }

    fn solve(&self, pieces_a: &[ShapePiece<T>], pieces_b: &[ShapePiece<T>]) -> PairResult<T> {
        let grow = self.tol + self.extension;
        let extents_b: Vec<_> = pieces_b
            .iter()
            .map(|p| piece_extents(&p.piece).map(|bb| extents::expanded(&bb, grow)))
            .collect();

        let mut results = Vec::new();
        for pa in pieces_a {
            let bb_a = piece_extents(&pa.piece).map(|bb| extents::expanded(&bb, grow));
            for (pb, bb_b) in pieces_b.iter().zip(&extents_b) {
                if let (Some(bb_a), Some(bb_b)) = (&bb_a, bb_b) {
                    if !extents_overlap(bb_a, bb_b) {
                        continue;
                    }
                }

                for r in self.solve_pieces(pa, pb)? {
                    results.push(IntersectionResult {
                        param1: pa.shape_param(r.param1),
                        param2: pb.shape_param(r.param2),
                        ..r
                    });
                }
            }
        }

        Ok(results)
    }

    fn solve_pieces(&self, a: &ShapePiece<T>, b: &ShapePiece<T>) -> PairResult<T> {
        let ra = a.reach(self.extension);
        let rb = b.reach(self.extension);
        let tol = self.tol;

        let results = match (&a.piece, &b.piece) {
            (Piece::Line(la), Piece::Line(lb)) => analytic::line_line(la, ra, lb, rb, tol),
            (Piece::Line(l), Piece::Arc(arc)) => analytic::line_arc(l, ra, arc, rb, tol),
            (Piece::Arc(arc), Piece::Line(l)) => swap_all(analytic::line_arc(l, rb, arc, ra, tol)),
            (Piece::Arc(aa), Piece::Arc(ab)) => analytic::arc_arc(aa, ra, ab, rb, tol),
            (Piece::Line(l), Piece::Ellipse(e)) => analytic::line_ellipse(l, ra, e, tol),
            (Piece::Ellipse(e), Piece::Line(l)) => swap_all(analytic::line_ellipse(l, rb, e, tol)),
            (pa, pb) => numeric::curve_curve(pa, pb, tol).map_err(|reason| {
                IntersectError::SolverFailure {
                    shape_id_a: self.first.id.clone(),
                    shape_id_b: self.second.id.clone(),
                    reason,
                }
            })?,
        };

        Ok(results)
    }
}

fn swap_all<T: Real>(results: Vec<IntersectionResult<T>>) -> Vec<IntersectionResult<T>> {
    results.into_iter().map(IntersectionResult::swapped).collect()
}
