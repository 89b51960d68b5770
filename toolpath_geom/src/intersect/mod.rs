//! Pairwise shape intersection.
//!
//! Shape pairs are put in canonical [ShapeKind] order and dispatched to one routine per unordered
//! kind pair. Line, arc and circle pairs (and lines against ellipses) are solved in closed form,
//! every other combination goes through a sampled Newton refinement. Raw results are then
//! clustered so touching segments do not report the same point more than once.

mod analytic;
mod cluster;
mod numeric;
mod pairs;
mod piece;

pub use cluster::{cluster_results, select_consecutive_offset};
pub use numeric::NUMERIC_TOLERANCE;

use tracing::{trace, warn};

use crate::{
    core::{math::Vector2, traits::Real},
    error::IntersectError,
    shape::{extents, Shape, ShapeKind},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Confidence of a closed form crossing.
pub const EXACT_CONFIDENCE: f64 = 1.0;
/// Confidence of a closed form tangent touch.
pub const TANGENT_CONFIDENCE: f64 = 0.95;
/// Confidence of a numeric result that converged.
pub const CONVERGED_CONFIDENCE: f64 = 0.9;
/// Confidence of a result that lies on a curve extension.
pub const EXTENSION_CONFIDENCE: f64 = 0.8;
/// Confidence of a numeric result that did not converge.
pub const APPROXIMATE_CONFIDENCE: f64 = 0.6;
/// Factor applied to the confidence of clusters whose members disagree on type.
pub const MIXED_CLUSTER_FACTOR: f64 = 0.8;

/// How an intersection point was obtained.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IntersectionType {
    /// Lies on both curves.
    True,
    /// Best estimate from a numeric solve or a mixed cluster.
    Approximate,
    /// Lies on the extension of at least one curve.
    Infinite,
}

/// A point where two shapes meet.
///
/// `param1` and `param2` are parametric positions on the first and second shape as given by the
/// caller, in the parametrization of [Shape::point_at_parameter]. Polylines and splines use the
/// fraction of total length. Values fall outside `[0, 1]` for extension hits.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IntersectionResult<T = f64> {
    pub point: Vector2<T>,
    pub param1: T,
    pub param2: T,
    pub confidence: T,
    pub intersection_type: IntersectionType,
    pub on_extension: bool,
}

impl<T> IntersectionResult<T>
where
    T: Real,
{
    #[inline]
    pub fn new(point: Vector2<T>, param1: T, param2: T) -> Self {
        IntersectionResult {
            point,
            param1,
            param2,
            confidence: T::constant(EXACT_CONFIDENCE),
            intersection_type: IntersectionType::True,
            on_extension: false,
        }
    }

    /// Same result with the two parameter slots exchanged.
    #[inline]
    pub fn swapped(self) -> Self {
        IntersectionResult {
            param1: self.param2,
            param2: self.param1,
            ..self
        }
    }
}

/// Which results the caller wants back for a pair.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum IntersectMode {
    /// Every clustered intersection.
    #[default]
    All,
    /// At most one result: consecutive offset segments meet at exactly one point, the result
    /// closest to any end point of the two shapes is kept.
    ConsecutiveOffset,
}

/// Options for [find_shape_intersections].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IntersectOptions<T = f64> {
    /// Distance below which points are considered equal, also the clustering radius.
    pub tolerance: T,
    /// Allow lines and arcs to be extended when searching for intersects.
    pub allow_extensions: bool,
    /// Extension distance applied at each extendable end when `allow_extensions` is true.
    pub extension_length: T,
    pub mode: IntersectMode,
}

impl<T> IntersectOptions<T>
where
    T: Real,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            tolerance: T::constant(1e-5),
            allow_extensions: false,
            extension_length: T::zero(),
            mode: IntersectMode::All,
        }
    }

    #[inline]
    pub fn with_tolerance(tolerance: T) -> Self {
        Self {
            tolerance,
            ..Self::new()
        }
    }

    /// Extension distance actually applied, zero when extensions are off.
    #[inline]
    pub fn effective_extension(&self) -> T {
        if self.allow_extensions && self.extension_length > T::zero() {
            self.extension_length
        } else {
            T::zero()
        }
    }
}

impl<T> Default for IntersectOptions<T>
where
    T: Real,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Find the intersections between `shape_a` and `shape_b`.
///
/// Results are clustered by `options.tolerance`. Kind pairs without a solver and degenerate
/// geometry give an empty list. Errors are only returned for splines that cannot be evaluated
/// or when the numeric solver produces non-finite values.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::shape::*;
/// # use toolpath_geom::intersect::*;
/// # use toolpath_geom::core::math::*;
/// let a = Shape::line("a", Vector2::new(0.0, 0.0), Vector2::new(10.0, 10.0));
/// let b = Shape::line("b", Vector2::new(0.0, 10.0), Vector2::new(10.0, 0.0));
/// let results = find_shape_intersections(&a, &b, &IntersectOptions::new()).unwrap();
/// assert_eq!(results.len(), 1);
/// assert!(results[0].point.fuzzy_eq(Vector2::new(5.0, 5.0)));
/// assert_eq!(results[0].intersection_type, IntersectionType::True);
/// ```
pub fn find_shape_intersections<T>(
    shape_a: &Shape<T>,
    shape_b: &Shape<T>,
    options: &IntersectOptions<T>,
) -> Result<Vec<IntersectionResult<T>>, IntersectError>
where
    T: Real,
{
    let swap = shape_a.kind() > shape_b.kind();
    let (first, second) = if swap {
        (shape_b, shape_a)
    } else {
        (shape_a, shape_b)
    };

    trace!(
        first = %first.id,
        second = %second.id,
        first_kind = ?first.kind(),
        second_kind = ?second.kind(),
        swap,
        "dispatching intersection pair"
    );

    let raw = pairs::dispatch(first, second, options)?;
    let raw = if swap {
        raw.into_iter().map(IntersectionResult::swapped).collect()
    } else {
        raw
    };

    let mut results = cluster_results(raw, options.tolerance);
    if options.mode == IntersectMode::ConsecutiveOffset && results.len() > 1 {
        results = select_consecutive_offset(&results, shape_a, shape_b)
            .into_iter()
            .collect();
    }

    Ok(results)
}

/// Intersections found for one pair of shapes in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PairIntersections<T = f64> {
    pub index_a: usize,
    pub index_b: usize,
    pub results: Vec<IntersectionResult<T>>,
}

/// Output of [find_all_intersections].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchIntersections<T = f64> {
    /// Pairs with at least one intersection, ordered by `(index_a, index_b)`.
    pub pairs: Vec<PairIntersections<T>>,
    /// Pairs whose solve failed, the rest of the batch is unaffected.
    pub failures: Vec<(usize, usize, IntersectError)>,
}

/// Intersect every pair of `shapes` (`i < j`), pairs with disjoint extents are skipped.
pub fn find_all_intersections<T>(
    shapes: &[Shape<T>],
    options: &IntersectOptions<T>,
) -> BatchIntersections<T>
where
    T: Real,
{
    let mut batch = BatchIntersections {
        pairs: Vec::new(),
        failures: Vec::new(),
    };

    if shapes.len() < 2 {
        return batch;
    }

    let grow = options.tolerance + options.effective_extension();
    let boxes: Vec<_> = shapes
        .iter()
        .map(|s| extents::expanded(&s.bounding_box(), grow))
        .collect();
    let index = extents::build_index(&boxes);

    for (i, bb) in boxes.iter().enumerate() {
        let mut candidates = index.query(bb.min_x, bb.min_y, bb.max_x, bb.max_y);
        candidates.retain(|&j| j > i);
        candidates.sort_unstable();
        for j in candidates {
            match find_shape_intersections(&shapes[i], &shapes[j], options) {
                Ok(results) if results.is_empty() => {}
                Ok(results) => batch.pairs.push(PairIntersections {
                    index_a: i,
                    index_b: j,
                    results,
                }),
                Err(e) => {
                    warn!(index_a = i, index_b = j, error = %e, "intersection solve failed");
                    batch.failures.push((i, j, e));
                }
            }
        }
    }

    batch
}

/// Returns true if the canonical kind pair has a dedicated routine. Every pair of the six kinds
/// is currently covered.
pub fn is_supported_pair(a: ShapeKind, b: ShapeKind) -> bool {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    pairs::routine_name(lo, hi).is_some()
}
