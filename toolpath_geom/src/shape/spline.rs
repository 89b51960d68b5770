use static_aabb2d_index::AABB;

use super::extents;
use crate::{
    core::{
        math::{clamp_unit, Vector2},
        traits::Real,
    },
    error::SplineError,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Samples used to measure and locate points along splines.
pub const SPLINE_TESSELLATION_SAMPLES: usize = 100;

/// Length reported for splines whose path has fewer than two points.
pub const SPLINE_FALLBACK_LENGTH: f64 = 0.0;

/// Spline as read from a drawing.
///
/// An empty `knots` list means a clamped uniform knot vector and empty `weights` means a
/// non-rational curve. `fit_points` are only used when the control point definition cannot be
/// evaluated.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spline<T = f64> {
    pub degree: usize,
    pub control_points: Vec<Vector2<T>>,
    pub knots: Vec<T>,
    pub weights: Vec<T>,
    pub fit_points: Vec<Vector2<T>>,
    pub closed: bool,
}

impl<T> Spline<T>
where
    T: Real,
{
    /// Non-rational spline with a clamped uniform knot vector.
    pub fn new(degree: usize, control_points: Vec<Vector2<T>>) -> Self {
        Spline {
            degree,
            control_points,
            ..Default::default()
        }
    }

    /// Try to build the evaluable NURBS curve.
    #[inline]
    pub fn to_nurbs(&self) -> Result<NurbsCurve<T>, SplineError> {
        NurbsCurve::from_spline(self)
    }

    /// Points approximating the curve path, in travel order.
    ///
    /// Uses the tessellated NURBS curve when valid, otherwise falls back to fit points and then
    /// control points.
    pub fn path_points(&self) -> Vec<Vector2<T>> {
        if let Ok(nurbs) = self.to_nurbs() {
            return nurbs.tessellate(SPLINE_TESSELLATION_SAMPLES);
        }

        if self.fit_points.len() >= 2 {
            return self.fit_points.clone();
        }

        self.control_points.clone()
    }

    pub fn start_point(&self) -> Vector2<T> {
        match self.to_nurbs() {
            Ok(nurbs) => nurbs.point_at(T::zero()),
            Err(_) => self
                .fit_points
                .first()
                .or_else(|| self.control_points.first())
                .copied()
                .unwrap_or_else(Vector2::zero),
        }
    }

    pub fn end_point(&self) -> Vector2<T> {
        match self.to_nurbs() {
            Ok(nurbs) => nurbs.point_at(T::one()),
            Err(_) => self
                .fit_points
                .last()
                .or_else(|| self.control_points.last())
                .copied()
                .unwrap_or_else(Vector2::zero),
        }
    }

    /// Approximate length from the tessellated path, [SPLINE_FALLBACK_LENGTH] when no path can
    /// be formed.
    pub fn length(&self) -> T {
        let path = self.path_points();
        if path.len() < 2 {
            return T::constant(SPLINE_FALLBACK_LENGTH);
        }

        path_length(&path)
    }

    /// Point at `t` in `[0, 1]` (clamped) of the approximate arc length.
    pub fn point_at(&self, t: T) -> Vector2<T> {
        point_along_path(&self.path_points(), t)
    }

    pub fn reversed(&self) -> Self {
        let knots = match (self.knots.first(), self.knots.last()) {
            (Some(&first), Some(&last)) => {
                self.knots.iter().rev().map(|&k| first + last - k).collect()
            }
            _ => Vec::new(),
        };

        Spline {
            degree: self.degree,
            control_points: self.control_points.iter().rev().copied().collect(),
            knots,
            weights: self.weights.iter().rev().copied().collect(),
            fit_points: self.fit_points.iter().rev().copied().collect(),
            closed: self.closed,
        }
    }

    pub fn bounding_box(&self) -> AABB<T> {
        extents::points_extents(self.path_points())
            .unwrap_or_else(|| extents::point_extents(Vector2::zero()))
    }
}

/// Sum of the straight distances between consecutive `points`.
pub fn path_length<T>(points: &[Vector2<T>]) -> T
where
    T: Real,
{
    points
        .windows(2)
        .fold(T::zero(), |acc, w| acc + (w[1] - w[0]).length())
}

/// Walk `points` to the fraction `t` of their total length.
pub fn point_along_path<T>(points: &[Vector2<T>], t: T) -> Vector2<T>
where
    T: Real,
{
    let first = match points.first() {
        Some(&p) => p,
        None => return Vector2::zero(),
    };

    let total = path_length(points);
    if !(total > T::zero()) {
        return first;
    }

    let target = clamp_unit(t) * total;
    let mut traveled = T::zero();
    for w in points.windows(2) {
        let len = (w[1] - w[0]).length();
        if len > T::zero() && traveled + len >= target {
            return w[0].lerp(w[1], (target - traveled) / len);
        }
        traveled = traveled + len;
    }

    points[points.len() - 1]
}

/// Validated (rational) B-spline curve ready for evaluation.
///
/// Public evaluation functions take a normalized parameter in `[0, 1]` mapped onto the knot
/// domain.
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsCurve<T = f64> {
    degree: usize,
    control_points: Vec<Vector2<T>>,
    knots: Vec<T>,
    weights: Vec<T>,
}

impl<T> NurbsCurve<T>
where
    T: Real,
{
    pub fn from_spline(spline: &Spline<T>) -> Result<Self, SplineError> {
        let count = spline.control_points.len();
        let degree = spline.degree;
        if count < 2 {
            return Err(SplineError::TooFewControlPoints { count });
        }
        if degree == 0 || degree >= count {
            return Err(SplineError::InvalidDegree {
                degree,
                control_points: count,
            });
        }
        if spline.control_points.iter().any(|p| !p.is_finite()) {
            return Err(SplineError::NonFinite);
        }

        let knots = if spline.knots.is_empty() {
            clamped_uniform_knots(count, degree)
        } else {
            let expected = count + degree + 1;
            if spline.knots.len() != expected {
                return Err(SplineError::KnotCountMismatch {
                    expected,
                    actual: spline.knots.len(),
                });
            }
            if spline.knots.iter().any(|k| !k.is_finite()) {
                return Err(SplineError::NonFinite);
            }
            if !is_non_decreasing(&spline.knots) {
                return Err(SplineError::InvalidKnots);
            }
            spline.knots.clone()
        };

        if !(knots[count] > knots[degree]) {
            return Err(SplineError::InvalidKnots);
        }

        let weights = if spline.weights.is_empty() {
            vec![T::one(); count]
        } else {
            if spline.weights.len() != count
                || spline
                    .weights
                    .iter()
                    .any(|w| !w.is_finite() || *w <= T::zero())
            {
                return Err(SplineError::InvalidWeights);
            }
            spline.weights.clone()
        };

        Ok(NurbsCurve {
            degree,
            control_points: spline.control_points.clone(),
            knots,
            weights,
        })
    }

    /// Knot domain `(u_min, u_max)` the curve is defined over.
    #[inline]
    pub fn domain(&self) -> (T, T) {
        (
            self.knots[self.degree],
            self.knots[self.control_points.len()],
        )
    }

    /// Point at normalized parameter `s` in `[0, 1]` (clamped).
    pub fn point_at(&self, s: T) -> Vector2<T> {
        let (u0, u1) = self.domain();
        self.eval_knot(u0 + clamp_unit(s) * (u1 - u0))
    }

    /// Derivative with respect to the normalized parameter, by central difference.
    pub fn derivative_at(&self, s: T) -> Vector2<T> {
        let h = T::constant(1e-6);
        let s = clamp_unit(s);
        let lo = num_traits::real::Real::max(s - h, T::zero());
        let hi = num_traits::real::Real::min(s + h, T::one());
        let span = hi - lo;
        if !(span > T::zero()) {
            return Vector2::zero();
        }
        (self.point_at(hi) - self.point_at(lo)).scale(T::one() / span)
    }

    /// `samples + 1` points at evenly spaced normalized parameters.
    pub fn tessellate(&self, samples: usize) -> Vec<Vector2<T>> {
        let samples = samples.max(1);
        let n = T::constant(samples as f64);
        (0..=samples)
            .map(|i| self.point_at(T::constant(i as f64) / n))
            .collect()
    }

    /// Cumulative length of [tessellate](Self::tessellate) at each sample, as a fraction of the
    /// total. Empty when the tessellated path has no length.
    pub fn length_fractions(&self, samples: usize) -> Vec<T> {
        let points = self.tessellate(samples);
        let mut fractions = Vec::with_capacity(points.len());
        let mut traveled = T::zero();
        fractions.push(traveled);
        for w in points.windows(2) {
            traveled = traveled + (w[1] - w[0]).length();
            fractions.push(traveled);
        }

        if !(traveled > T::zero()) {
            return Vec::new();
        }
        fractions.iter().map(|&f| f / traveled).collect()
    }

    fn eval_knot(&self, u: T) -> Vector2<T> {
        let p = self.degree;
        let n = self.control_points.len() - 1;
        let span = find_span(n, p, u, &self.knots);

        let mut d: Vec<HPoint3<T>> = (0..=p)
            .map(|j| {
                let idx = span - p + j;
                let w = self.weights[idx];
                let cp = self.control_points[idx];
                HPoint3::new(cp.x * w, cp.y * w, w)
            })
            .collect();

        de_boor(&mut d, span, p, u, &self.knots);
        d[p].to_point()
            .unwrap_or_else(|| self.control_points[span - p])
    }
}

fn clamped_uniform_knots<T>(count: usize, degree: usize) -> Vec<T>
where
    T: Real,
{
    let interior = count - degree - 1;
    let denom = T::constant((interior + 1) as f64);
    let mut knots = Vec::with_capacity(count + degree + 1);
    knots.extend(std::iter::repeat(T::zero()).take(degree + 1));
    knots.extend((1..=interior).map(|i| T::constant(i as f64) / denom));
    knots.extend(std::iter::repeat(T::one()).take(degree + 1));
    knots
}

fn is_non_decreasing<T: Real>(knots: &[T]) -> bool {
    knots.windows(2).all(|w| w[0] <= w[1])
}

fn find_span<T: Real>(n: usize, p: usize, u: T, knots: &[T]) -> usize {
    if u >= knots[n + 1] {
        // last non-empty span
        let mut span = n;
        while span > p && knots[span] >= knots[span + 1] {
            span -= 1;
        }
        return span;
    }
    if u <= knots[p] {
        return p;
    }

    let mut low = p;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

fn de_boor<T: Real>(d: &mut [HPoint3<T>], span: usize, p: usize, u: T, knots: &[T]) {
    for r in 1..=p {
        for j in (r..=p).rev() {
            let i = span - p + j;
            let denom = knots[i + p + 1 - r] - knots[i];
            let alpha = if denom == T::zero() {
                T::zero()
            } else {
                (u - knots[i]) / denom
            };
            d[j] = d[j - 1].lerp(d[j], alpha);
        }
    }
}

/// Homogeneous 2D point (weighted x, weighted y, weight).
#[derive(Debug, Clone, Copy, PartialEq)]
struct HPoint3<T> {
    x: T,
    y: T,
    w: T,
}

impl<T: Real> HPoint3<T> {
    fn new(x: T, y: T, w: T) -> Self {
        HPoint3 { x, y, w }
    }

    fn lerp(self, rhs: Self, t: T) -> Self {
        let s = T::one() - t;
        HPoint3::new(
            self.x * s + rhs.x * t,
            self.y * s + rhs.y * t,
            self.w * s + rhs.w * t,
        )
    }

    fn to_point(self) -> Option<Vector2<T>> {
        if self.w.is_finite() && self.w != T::zero() {
            Some(Vector2::new(self.x / self.w, self.y / self.w))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic() -> Spline {
        Spline::new(
            2,
            vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 2.0),
                Vector2::new(2.0, 0.0),
            ],
        )
    }

    #[test]
    fn clamped_uniform_knot_vector() {
        let knots: Vec<f64> = clamped_uniform_knots(5, 2);
        assert_eq!(knots, vec![0.0, 0.0, 0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn bezier_like_evaluation() {
        let nurbs = quadratic().to_nurbs().unwrap();
        assert_fuzzy_eq!(nurbs.point_at(0.0), Vector2::new(0.0, 0.0));
        assert_fuzzy_eq!(nurbs.point_at(1.0), Vector2::new(2.0, 0.0));
        // quadratic bezier midpoint is (p0 + 2 p1 + p2) / 4
        assert_fuzzy_eq!(nurbs.point_at(0.5), Vector2::new(1.0, 1.0));
    }

    #[test]
    fn rational_quarter_circle() {
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let spline = Spline {
            degree: 2,
            control_points: vec![
                Vector2::new(1.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.0, 1.0),
            ],
            weights: vec![1.0, w, 1.0],
            ..Default::default()
        };
        let nurbs = spline.to_nurbs().unwrap();
        for p in nurbs.tessellate(10) {
            assert_fuzzy_eq!(p.length(), 1.0, 1e-9);
        }
    }

    #[test]
    fn invalid_definitions() {
        let mut s = quadratic();
        s.degree = 3;
        assert_eq!(
            s.to_nurbs(),
            Err(SplineError::InvalidDegree {
                degree: 3,
                control_points: 3
            })
        );

        let mut s = quadratic();
        s.knots = vec![0.0, 0.0, 1.0, 1.0];
        assert_eq!(
            s.to_nurbs(),
            Err(SplineError::KnotCountMismatch {
                expected: 6,
                actual: 4
            })
        );

        let mut s = quadratic();
        s.knots = vec![0.0, 0.0, 1.0, 0.5, 1.0, 1.0];
        assert_eq!(s.to_nurbs(), Err(SplineError::InvalidKnots));

        let mut s = quadratic();
        s.weights = vec![1.0, -1.0, 1.0];
        assert_eq!(s.to_nurbs(), Err(SplineError::InvalidWeights));
    }

    #[test]
    fn fallback_to_fit_points() {
        let spline = Spline {
            degree: 3,
            control_points: vec![Vector2::new(5.0, 5.0)],
            fit_points: vec![Vector2::new(0.0, 0.0), Vector2::new(3.0, 4.0)],
            ..Default::default()
        };
        assert_fuzzy_eq!(spline.length(), 5.0);
        assert_eq!(spline.start_point(), Vector2::new(0.0, 0.0));
        assert_eq!(spline.end_point(), Vector2::new(3.0, 4.0));
        assert_fuzzy_eq!(spline.point_at(0.5), Vector2::new(1.5, 2.0));
    }

    #[test]
    fn reversal_swaps_ends() {
        let mut s = quadratic();
        s.knots = vec![0.0, 0.0, 0.0, 2.0, 2.0, 2.0];
        s.control_points[2] = Vector2::new(4.0, 1.0);
        let rev = s.reversed();
        assert_fuzzy_eq!(rev.start_point(), s.end_point());
        assert_fuzzy_eq!(rev.end_point(), s.start_point());
        assert_eq!(rev.reversed(), s);
    }

    #[test]
    fn empty_spline_is_finite() {
        let s: Spline = Spline::default();
        assert_eq!(s.length(), SPLINE_FALLBACK_LENGTH);

        let single = Spline::new(3, vec![Vector2::new(4.0, 5.0)]);
        assert_eq!(single.length(), SPLINE_FALLBACK_LENGTH);
        assert_eq!(single.start_point(), Vector2::new(4.0, 5.0));
        assert_eq!(s.point_at(0.5), Vector2::zero());
        assert_eq!(s.start_point(), Vector2::zero());
    }

    #[test]
    fn length_fractions_follow_speed() {
        // x = 2 s, fast near the ends and slow at the apex
        let nurbs = quadratic().to_nurbs().unwrap();
        let fractions = nurbs.length_fractions(SPLINE_TESSELLATION_SAMPLES);
        assert_eq!(fractions.len(), SPLINE_TESSELLATION_SAMPLES + 1);
        assert_fuzzy_eq!(fractions[0], 0.0);
        assert_fuzzy_eq!(fractions[SPLINE_TESSELLATION_SAMPLES], 1.0);
        assert_fuzzy_eq!(fractions[50], 0.5, 1e-9);
        assert!(fractions[10] > 0.1);
    }
}
