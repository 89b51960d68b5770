use tracing::{debug, warn};

use super::Chain;
use crate::{
    core::{math::Vector2, traits::Real},
    shape::Shape,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for [normalize_chain] and [analyze_chain_traversal](super::analyze_chain_traversal).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NormalizeOptions<T = f64> {
    /// Distance below which two end points are considered connected.
    pub traversal_tolerance: T,
    /// Number of anchor shapes tried when a traversal from the first shape does not visit every
    /// shape.
    pub max_traversal_attempts: usize,
}

impl<T> NormalizeOptions<T>
where
    T: Real,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            traversal_tolerance: T::constant(0.01),
            max_traversal_attempts: 5,
        }
    }

    #[inline]
    pub fn with_tolerance(traversal_tolerance: T) -> Self {
        Self {
            traversal_tolerance,
            ..Self::new()
        }
    }
}

impl<T> Default for NormalizeOptions<T>
where
    T: Real,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Which end of a candidate shape touched the traversal end being extended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Touch {
    Start,
    End,
}

#[derive(Debug, Copy, Clone)]
struct Candidate<T> {
    index: usize,
    touch: Touch,
    dist: T,
}

impl<T: Real> Candidate<T> {
    /// Closest first, then lowest original index, then a start match before an end match.
    fn better_than(&self, other: &Candidate<T>) -> bool {
        if self.dist < other.dist {
            return true;
        }
        if self.dist > other.dist {
            return false;
        }
        (self.index, self.touch) < (other.index, other.touch)
    }
}

/// Unused shape with an end point closest to `target` (within `tol`), `ends` gives the two
/// points checked per shape in preference order.
fn closest_candidate<T>(
    shapes: &[Shape<T>],
    used: &[bool],
    target: Vector2<T>,
    tol: T,
    ends: fn(&Shape<T>) -> [(Touch, Vector2<T>); 2],
) -> Option<Candidate<T>>
where
    T: Real,
{
    let mut best: Option<Candidate<T>> = None;
    for (index, shape) in shapes.iter().enumerate() {
        if used[index] {
            continue;
        }
        for (touch, p) in ends(shape) {
            let dist = (p - target).length();
            if !(dist < tol) {
                continue;
            }
            let c = Candidate { index, touch, dist };
            if best.as_ref().map_or(true, |b| c.better_than(b)) {
                best = Some(c);
            }
        }
    }
    best
}

fn shape_ends<T: Real>(shape: &Shape<T>) -> [(Touch, Vector2<T>); 2] {
    [
        (Touch::Start, shape.start_point()),
        (Touch::End, shape.end_point()),
    ]
}

/// Greedy traversal anchored at `anchor`: extend the end, then extend the start backwards.
/// Returns the traversal and which input shapes it used.
fn traverse_from<T>(shapes: &[Shape<T>], anchor: usize, tol: T) -> (Vec<Shape<T>>, Vec<bool>)
where
    T: Real,
{
    let mut used = vec![false; shapes.len()];
    used[anchor] = true;
    let mut sequence = std::collections::VecDeque::with_capacity(shapes.len());
    sequence.push_back(shapes[anchor].clone());

    loop {
        let Some(tail) = sequence.back().map(|s: &Shape<T>| s.end_point()) else {
            break;
        };
        let Some(c) = closest_candidate(shapes, &used, tail, tol, shape_ends) else {
            break;
        };
        used[c.index] = true;
        let next = match c.touch {
            Touch::Start => shapes[c.index].clone(),
            Touch::End => shapes[c.index].reversed(),
        };
        sequence.push_back(next);
    }

    loop {
        let Some(head) = sequence.front().map(|s: &Shape<T>| s.start_point()) else {
            break;
        };
        // a shape ending at the head is prepended as is, one starting there is reversed
        let Some(c) = closest_candidate(shapes, &used, head, tol, |s| {
            [(Touch::Start, s.end_point()), (Touch::End, s.start_point())]
        }) else {
            break;
        };
        used[c.index] = true;
        let prev = match c.touch {
            Touch::Start => shapes[c.index].clone(),
            Touch::End => shapes[c.index].reversed(),
        };
        sequence.push_front(prev);
    }

    (sequence.into_iter().collect(), used)
}

/// Number of leading shapes that connect end to start.
fn connected_prefix_len<T>(shapes: &[Shape<T>], tol: T) -> usize
where
    T: Real,
{
    if shapes.is_empty() {
        return 0;
    }
    1 + shapes
        .windows(2)
        .take_while(|w| (w[1].start_point() - w[0].end_point()).length() < tol)
        .count()
}

/// One joining pass over `shapes`. Returns the longest anchored traversal followed by the
/// shapes it missed, or `None` when no traversal beats the connected prefix already in place.
fn join_pass<T>(shapes: &[Shape<T>], attempts: usize, tol: T) -> Option<Vec<Shape<T>>>
where
    T: Real,
{
    let prefix = connected_prefix_len(shapes, tol);
    if prefix == shapes.len() {
        return None;
    }

    let mut best: Vec<Shape<T>> = Vec::new();
    let mut best_used = Vec::new();
    for anchor in 0..attempts {
        let (sequence, used) = traverse_from(shapes, anchor, tol);
        if sequence.len() > best.len() {
            best = sequence;
            best_used = used;
        }
        if best.len() == shapes.len() {
            break;
        }
    }

    if best.len() <= prefix {
        return None;
    }

    let leftover = shapes
        .iter()
        .zip(&best_used)
        .filter(|(_, used)| !**used)
        .map(|(s, _)| s.clone());
    best.extend(leftover);
    Some(best)
}

/// Order and orient the shapes of `chain` into one traversal.
///
/// Shapes are joined greedily from an anchor: first the end of the traversal is extended, then
/// its start. A shape touching with its far end is reversed (arcs swap angles and flip
/// direction, polylines reverse vertexes and negate bulges). When several shapes touch, the
/// closest wins, then the lowest original index, then a shape touching with its start.
///
/// The first `max_traversal_attempts` shapes are tried as anchors and the longest traversal is
/// kept, shapes it missed follow in their original order and orientation. The pass repeats on
/// its own output while it lengthens the run of connected shapes at the front, and a chain whose
/// leading run no pass can beat is returned unchanged. The result is therefore a fixed point:
/// normalizing it again gives the same chain.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::shape::*;
/// # use toolpath_geom::chain::*;
/// # use toolpath_geom::core::math::*;
/// let chain = Chain::new(
///     "c",
///     vec![
///         Shape::line("b", Vector2::new(10.0, 0.0), Vector2::new(10.0, 10.0)),
///         Shape::line("a", Vector2::new(10.0, 0.0), Vector2::new(0.0, 0.0)),
///     ],
/// );
/// let normalized = normalize_chain(&chain, &NormalizeOptions::new());
/// let ids: Vec<_> = normalized.shape_ids().map(|id| id.as_str()).collect();
/// assert_eq!(ids, ["a", "b"]);
/// assert!(normalized.shapes[0].start_point().fuzzy_eq(Vector2::new(0.0, 0.0)));
/// ```
pub fn normalize_chain<T>(chain: &Chain<T>, options: &NormalizeOptions<T>) -> Chain<T>
where
    T: Real,
{
    let tol = options.traversal_tolerance;
    if chain.len() < 2 || chain.is_connected_in_order(tol) {
        return chain.clone();
    }

    let attempts = options.max_traversal_attempts.clamp(1, chain.len());
    let mut shapes = chain.shapes.clone();
    // every accepted pass grows the connected prefix by at least one shape
    for _ in 1..chain.len() {
        match join_pass(&shapes, attempts, tol) {
            Some(next) => shapes = next,
            None => break,
        }
    }

    let joined = connected_prefix_len(&shapes, tol);
    if joined < shapes.len() {
        warn!(
            chain = %chain.id,
            joined,
            unresolved = shapes.len() - joined,
            attempts,
            "chain could not be joined into a single traversal"
        );
    } else {
        debug!(chain = %chain.id, shape_count = shapes.len(), "normalized chain");
    }

    Chain {
        id: chain.id.clone(),
        shapes,
    }
}

/// [normalize_chain] over every chain.
pub fn normalize_chains<T>(chains: &[Chain<T>], options: &NormalizeOptions<T>) -> Vec<Chain<T>>
where
    T: Real,
{
    chains.iter().map(|c| normalize_chain(c, options)).collect()
}
