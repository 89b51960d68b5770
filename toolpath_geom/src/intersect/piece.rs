//! Decomposition of shapes into the primitive curves the solvers work on.

use crate::{
    core::{
        math::{clamp_unit, point_from_parametric, point_on_circle, Vector2},
        traits::Real,
    },
    shape::{
        seg_arc, seg_length, Arc, Ellipse, Line, NurbsCurve, Polyline,
        SPLINE_TESSELLATION_SAMPLES,
    },
};

/// Sample count upper bound for arcs and ellipses in the numeric solver.
const CURVE_SAMPLES: usize = 64;

/// A primitive curve with a local parameter in `[0, 1]`.
#[derive(Debug, Clone)]
pub(crate) enum Piece<T: Real> {
    Line(Line<T>),
    Arc(Arc<T>),
    Ellipse(Ellipse<T>),
    Nurbs(NurbsCurve<T>),
}

/// A piece plus how its local parameter maps onto the owning shape and which of its ends may be
/// extended.
#[derive(Debug, Clone)]
pub(crate) struct ShapePiece<T: Real> {
    pub piece: Piece<T>,
    pub param_start: T,
    pub param_span: T,
    pub extend_start: bool,
    pub extend_end: bool,
    /// Cumulative length fractions at evenly spaced local parameters, when the shape parameter
    /// follows arc length rather than the local parameter. Empty for a linear map.
    pub length_fractions: Vec<T>,
}

impl<T> ShapePiece<T>
where
    T: Real,
{
    /// Piece covering the whole shape parameter range.
    pub fn whole(piece: Piece<T>, extendable: bool) -> Self {
        ShapePiece {
            piece,
            param_start: T::zero(),
            param_span: T::one(),
            extend_start: extendable,
            extend_end: extendable,
            length_fractions: Vec::new(),
        }
    }

    /// Whole spline piece, local knot parameters map onto the length fraction of the tessellated
    /// path.
    pub fn spline(nurbs: NurbsCurve<T>) -> Self {
        let length_fractions = nurbs.length_fractions(SPLINE_TESSELLATION_SAMPLES);
        ShapePiece {
            length_fractions,
            ..ShapePiece::whole(Piece::Nurbs(nurbs), false)
        }
    }

    pub fn shape_param(&self, local: T) -> T {
        let local = if self.length_fractions.len() < 2 {
            local
        } else {
            fraction_at(&self.length_fractions, local)
        };
        self.param_start + local * self.param_span
    }

    /// Extension distances available at the (start, end) of this piece.
    #[inline]
    pub fn reach(&self, extension: T) -> Reach<T> {
        Reach {
            start: if self.extend_start { extension } else { T::zero() },
            end: if self.extend_end { extension } else { T::zero() },
        }
    }
}

/// Interpolate `fractions` (sampled at evenly spaced parameters) at `t`, clamped to `[0, 1]`.
fn fraction_at<T>(fractions: &[T], t: T) -> T
where
    T: Real,
{
    let last = fractions.len() - 1;
    let x = clamp_unit(t) * T::constant(last as f64);
    let k = num_traits::ToPrimitive::to_usize(&x.floor())
        .unwrap_or(0)
        .min(last - 1);
    let frac = x - T::constant(k as f64);
    fractions[k] + (fractions[k + 1] - fractions[k]) * frac
}

/// Extension distance allowed before the start and after the end of a curve.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Reach<T> {
    pub start: T,
    pub end: T,
}

impl<T: Real> Reach<T> {
    #[inline]
    pub fn none() -> Self {
        Reach {
            start: T::zero(),
            end: T::zero(),
        }
    }
}

/// Line and arc pieces of a polyline, parameters map through the cumulative length fraction.
/// Only the outer ends of an open polyline are extendable.
pub(crate) fn polyline_pieces<T>(pline: &Polyline<T>) -> Vec<ShapePiece<T>>
where
    T: Real,
{
    let total = pline.length();
    if !(total > T::zero()) {
        return Vec::new();
    }

    let seg_count = pline.segment_count();
    let mut result = Vec::with_capacity(seg_count);
    let mut traveled = T::zero();
    for (i, (v1, v2)) in pline.iter_segments().enumerate() {
        let len = seg_length(v1, v2);
        if !(len > T::zero()) {
            continue;
        }

        let piece = match seg_arc(v1, v2) {
            Some(arc) => Piece::Arc(arc),
            None => Piece::Line(Line::new(v1.pos(), v2.pos())),
        };

        result.push(ShapePiece {
            piece,
            param_start: traveled / total,
            param_span: len / total,
            extend_start: !pline.is_closed && i == 0,
            extend_end: !pline.is_closed && i + 1 == seg_count,
            length_fractions: Vec::new(),
        });
        traveled = traveled + len;
    }

    result
}

/// Parametric curve evaluated by the numeric solver.
pub(crate) trait ParamCurve<T: Real> {
    fn eval(&self, t: T) -> Vector2<T>;
    fn derivative(&self, t: T) -> Vector2<T>;
    /// Number of chords used to bracket intersections.
    fn sample_count(&self) -> usize;
}

impl<T> ParamCurve<T> for Piece<T>
where
    T: Real,
{
    fn eval(&self, t: T) -> Vector2<T> {
        match self {
            Piece::Line(l) => point_from_parametric(l.start, l.end, t),
            Piece::Arc(a) => {
                point_on_circle(a.radius, a.center, a.start_angle + t * a.sweep_angle())
            }
            Piece::Ellipse(e) => {
                let (s, sweep) = e.param_range();
                e.point_at_param(s + t * sweep)
            }
            Piece::Nurbs(n) => n.point_at(t),
        }
    }

    fn derivative(&self, t: T) -> Vector2<T> {
        match self {
            Piece::Line(l) => l.end - l.start,
            Piece::Arc(a) => {
                let sweep = a.sweep_angle();
                let (s, c) = (a.start_angle + t * sweep).sin_cos();
                Vector2::new(-s, c).scale(a.radius * sweep)
            }
            Piece::Ellipse(e) => {
                let (s, sweep) = e.param_range();
                e.derivative_at_param(s + t * sweep).scale(sweep)
            }
            Piece::Nurbs(n) => n.derivative_at(t),
        }
    }

    fn sample_count(&self) -> usize {
        match self {
            Piece::Line(_) => 1,
            Piece::Arc(a) => sweep_samples(a.sweep_angle().abs()),
            Piece::Ellipse(e) => sweep_samples(e.param_range().1),
            Piece::Nurbs(_) => SPLINE_TESSELLATION_SAMPLES,
        }
    }
}

/// Chords for an angular sweep, one per `PI / 32` with a floor of 8.
fn sweep_samples<T: Real>(sweep: T) -> usize {
    let per_chord = T::pi() / T::constant(32.0);
    let n = (sweep / per_chord).ceil();
    let n = num_traits::ToPrimitive::to_usize(&n).unwrap_or(CURVE_SAMPLES);
    n.clamp(8, CURVE_SAMPLES)
}
