//! Part detection: classify closed chains into parts (outer boundaries) and holes.
//!
//! Closed chains are nested by true geometric containment, the nesting level decides the role of
//! each chain: even levels are part shells, odd levels are holes of the part directly around
//! them. Parts inside holes inside parts nest to any depth, the hierarchy is stored as an arena
//! of [DetectedPart]s linked by [PartId].

mod boundary;
mod containment;

use std::fmt;

use static_aabb2d_index::AABB;
use tracing::{debug, warn};

use crate::{
    chain::{analyze_traversal, normalize_chain, Chain, ChainId, NormalizeOptions},
    core::traits::Real,
    shape::extents,
};

use boundary::chain_boundary;
use containment::{nesting_levels, parents, Region};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for [detect_parts].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PartDetectionParameters<T = f64> {
    /// Straight segments used to approximate each ellipse and spline in a boundary.
    pub curve_samples: usize,
    /// Distance within which a point counts as on a boundary, the detection tolerance if `None`.
    pub containment_epsilon: Option<T>,
    /// Passed to chain normalization, which runs with the detection tolerance.
    pub max_traversal_attempts: usize,
}

impl<T> PartDetectionParameters<T>
where
    T: Real,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            curve_samples: 64,
            containment_epsilon: None,
            max_traversal_attempts: 5,
        }
    }
}

impl<T> Default for PartDetectionParameters<T>
where
    T: Real,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Index of a part in [PartDetectionResult::parts].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub usize);

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part-{}", self.0 + 1)
    }
}

/// Outer boundary of a part.
#[derive(Debug, Clone, PartialEq)]
pub struct PartShell<T = f64> {
    pub chain_id: ChainId,
    /// Index into [PartDetectionResult::chains].
    pub chain_index: usize,
    pub nesting_level: usize,
    pub bounding_box: AABB<T>,
    pub area: T,
}

/// Void inside a part, may hold further parts.
#[derive(Debug, Clone, PartialEq)]
pub struct PartHole<T = f64> {
    pub chain_id: ChainId,
    pub chain_index: usize,
    pub nesting_level: usize,
    pub bounding_box: AABB<T>,
    pub area: T,
    /// Parts whose shell sits directly inside this hole.
    pub nested_parts: Vec<PartId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedPart<T = f64> {
    pub id: PartId,
    pub shell: PartShell<T>,
    pub holes: Vec<PartHole<T>>,
    /// Part owning the hole this part sits in.
    pub parent: Option<PartId>,
}

impl<T> DetectedPart<T> {
    #[inline]
    pub fn nesting_level(&self) -> usize {
        self.shell.nesting_level
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PartWarningKind {
    /// An open chain has one end inside the extents of a closed chain and the other outside.
    OpenChainCrossesBoundary,
    /// Chains were given but no part was found.
    NoPartsFound,
    /// A chain still has traversal issues after normalization.
    UnresolvedTraversal,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PartDetectionWarning {
    pub id: String,
    pub kind: PartWarningKind,
    pub chain_id: Option<ChainId>,
    pub message: String,
}

/// Output of [detect_parts].
#[derive(Debug, Clone, PartialEq)]
pub struct PartDetectionResult<T = f64> {
    /// Normalized copies of the input chains, in input order.
    pub chains: Vec<Chain<T>>,
    /// Parts ordered by shell chain index.
    pub parts: Vec<DetectedPart<T>>,
    pub warnings: Vec<PartDetectionWarning>,
}

impl<T> PartDetectionResult<T> {
    #[inline]
    pub fn part(&self, id: PartId) -> Option<&DetectedPart<T>> {
        self.parts.get(id.0)
    }

    /// Parts not nested inside another part's hole.
    pub fn root_parts(&self) -> impl Iterator<Item = &DetectedPart<T>> + '_ {
        self.parts.iter().filter(|p| p.parent.is_none())
    }

    /// Chain of a part shell or hole.
    #[inline]
    pub fn chain(&self, chain_index: usize) -> Option<&Chain<T>> {
        self.chains.get(chain_index)
    }
}

#[derive(Default)]
struct Warnings {
    list: Vec<PartDetectionWarning>,
}

impl Warnings {
    fn push(&mut self, kind: PartWarningKind, chain_id: Option<ChainId>, message: String) {
        warn!(kind = ?kind, chain = ?chain_id.as_ref().map(|c| c.as_str()), "{}", message);
        let id = format!("warning-{}", self.list.len() + 1);
        self.list.push(PartDetectionWarning {
            id,
            kind,
            chain_id,
            message,
        });
    }
}

/// Classify `chains` into parts and holes.
///
/// Every chain is normalized first (with `tolerance` as traversal tolerance). A chain is closed
/// when its end lies within `tolerance` of its start. Closed chains are turned into boundary
/// polylines and nested by containment, each chain's parent is the smallest chain containing it.
/// Chains at even nesting levels become part shells, chains at odd levels become holes of their
/// parent's part.
///
/// Anomalies never fail the run, they are reported in [PartDetectionResult::warnings].
///
/// # Examples
///
/// ```
/// # use toolpath_geom::shape::*;
/// # use toolpath_geom::chain::*;
/// # use toolpath_geom::part::*;
/// # use toolpath_geom::core::math::*;
/// let chains = vec![
///     Chain::new("outer", vec![Shape::circle("o", Vector2::new(0.0, 0.0), 10.0)]),
///     Chain::new("inner", vec![Shape::circle("i", Vector2::new(1.0, 0.0), 2.0)]),
/// ];
/// let result = detect_parts(&chains, 1e-3, &PartDetectionParameters::new());
/// assert_eq!(result.parts.len(), 1);
/// assert_eq!(result.parts[0].holes.len(), 1);
/// assert_eq!(result.parts[0].holes[0].chain_id.as_str(), "inner");
/// assert!(result.warnings.is_empty());
/// ```
pub fn detect_parts<T>(
    chains: &[Chain<T>],
    tolerance: T,
    params: &PartDetectionParameters<T>,
) -> PartDetectionResult<T>
where
    T: Real,
{
    let normalize_options = NormalizeOptions {
        traversal_tolerance: tolerance,
        max_traversal_attempts: params.max_traversal_attempts,
    };
    let epsilon = params.containment_epsilon.unwrap_or(tolerance);
    let mut warnings = Warnings::default();

    let normalized: Vec<_> = chains
        .iter()
        .map(|c| normalize_chain(c, &normalize_options))
        .collect();

    for chain in &normalized {
        let analysis = analyze_traversal(chain, &normalize_options);
        if !analysis.can_traverse {
            warnings.push(
                PartWarningKind::UnresolvedTraversal,
                Some(chain.id.clone()),
                format!(
                    "chain {} has {} traversal issue(s) after normalization",
                    chain.id,
                    analysis.issues.len()
                ),
            );
        }
    }

    let mut regions = Vec::new();
    let mut open = Vec::new();
    for (i, chain) in normalized.iter().enumerate() {
        if chain.is_empty() {
            continue;
        }
        if !chain.is_closed(tolerance) {
            open.push(i);
            continue;
        }
        match chain_boundary(chain, params.curve_samples).and_then(|b| Region::new(i, b)) {
            Some(region) if region.area > T::zero() => regions.push(region),
            _ => debug!(chain = %chain.id, "closed chain encloses no area"),
        }
    }

    debug!(
        closed_count = regions.len(),
        open_count = open.len(),
        "classified chains"
    );

    let parent_of = parents(&regions, epsilon);
    let levels = nesting_levels(&parent_of);

    // regions are in chain order, so parts end up ordered by shell chain index
    let mut part_of_region = vec![None; regions.len()];
    let mut parts: Vec<DetectedPart<T>> = Vec::new();
    for (r, region) in regions.iter().enumerate() {
        if levels[r] % 2 == 0 {
            let id = PartId(parts.len());
            part_of_region[r] = Some(id);
            parts.push(DetectedPart {
                id,
                shell: PartShell {
                    chain_id: normalized[region.chain_index].id.clone(),
                    chain_index: region.chain_index,
                    nesting_level: levels[r],
                    bounding_box: region.bbox,
                    area: region.area,
                },
                holes: Vec::new(),
                parent: None,
            });
        }
    }

    // holes attach to the part of their parent shell, (part, hole slot) per hole region
    let mut hole_slot = vec![None; regions.len()];
    for (r, region) in regions.iter().enumerate() {
        if levels[r] % 2 == 1 {
            let Some(owner) = parent_of[r].and_then(|p| part_of_region[p]) else {
                continue;
            };
            let holes = &mut parts[owner.0].holes;
            hole_slot[r] = Some((owner, holes.len()));
            holes.push(PartHole {
                chain_id: normalized[region.chain_index].id.clone(),
                chain_index: region.chain_index,
                nesting_level: levels[r],
                bounding_box: region.bbox,
                area: region.area,
                nested_parts: Vec::new(),
            });
        }
    }

    for r in 0..regions.len() {
        let (Some(part), Some(parent)) = (part_of_region[r], parent_of[r]) else {
            continue;
        };
        if let Some((owner, slot)) = hole_slot[parent] {
            parts[part.0].parent = Some(owner);
            parts[owner.0].holes[slot].nested_parts.push(part);
        }
    }

    for &o in &open {
        let chain = &normalized[o];
        let (Some(start), Some(end)) = (chain.start_point(), chain.end_point()) else {
            continue;
        };
        for region in &regions {
            let start_in = extents::contains_point(&region.bbox, start, epsilon);
            let end_in = extents::contains_point(&region.bbox, end, epsilon);
            if start_in != end_in {
                warnings.push(
                    PartWarningKind::OpenChainCrossesBoundary,
                    Some(chain.id.clone()),
                    format!(
                        "open chain {} crosses the boundary of closed chain {}, the drawing may \
                         have a gap",
                        chain.id, normalized[region.chain_index].id
                    ),
                );
            }
        }
    }

    if parts.is_empty() && !normalized.is_empty() {
        let message = if regions.is_empty() {
            format!(
                "no parts found: none of the {} chain(s) is closed within tolerance, check for \
                 gaps in the geometry",
                normalized.len()
            )
        } else {
            format!(
                "no parts found: {} closed chain(s) could not be classified by containment",
                regions.len()
            )
        };
        warnings.push(PartWarningKind::NoPartsFound, None, message);
    }

    let hole_count: usize = parts.iter().map(|p| p.holes.len()).sum();
    debug!(
        part_count = parts.len(),
        hole_count,
        warning_count = warnings.list.len(),
        "detected parts"
    );

    PartDetectionResult {
        chains: normalized,
        parts,
        warnings: warnings.list,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::math::Vector2, shape::Shape};

    fn rect(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Chain {
        let p = [
            Vector2::new(x0, y0),
            Vector2::new(x1, y0),
            Vector2::new(x1, y1),
            Vector2::new(x0, y1),
        ];
        let shapes = (0..4)
            .map(|i| Shape::line(format!("{id}-{i}"), p[i], p[(i + 1) % 4]))
            .collect();
        Chain::new(id, shapes)
    }

    #[test]
    fn open_chain_crossing_boundary_warns() {
        let chains = vec![
            rect("r", 0.0, 0.0, 10.0, 10.0),
            Chain::new(
                "open",
                vec![Shape::line("l", Vector2::new(5.0, 5.0), Vector2::new(20.0, 5.0))],
            ),
        ];
        let result = detect_parts(&chains, 1e-3, &PartDetectionParameters::new());
        assert_eq!(result.parts.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(
            result.warnings[0].kind,
            PartWarningKind::OpenChainCrossesBoundary
        );
        assert_eq!(result.warnings[0].chain_id, Some(ChainId::new("open")));
    }

    #[test]
    fn only_open_chains_warns_no_parts() {
        let chains = vec![Chain::new(
            "open",
            vec![Shape::line("l", Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0))],
        )];
        let result = detect_parts(&chains, 1e-3, &PartDetectionParameters::new());
        assert!(result.parts.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, PartWarningKind::NoPartsFound);
        assert_eq!(result.warnings[0].id, "warning-1");
    }

    #[test]
    fn empty_input_is_quiet() {
        let result = detect_parts::<f64>(&[], 1e-3, &PartDetectionParameters::new());
        assert!(result.parts.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn scrambled_chain_is_normalized_first() {
        let mut chain = rect("r", 0.0, 0.0, 10.0, 10.0);
        chain.shapes.swap(1, 3);
        chain.shapes[2] = chain.shapes[2].reversed();
        let result = detect_parts(&[chain], 1e-3, &PartDetectionParameters::new());
        assert_eq!(result.parts.len(), 1);
        assert!(result.warnings.is_empty());
        assert!(result.chains[0].is_connected_in_order(1e-3));
        assert_fuzzy_eq!(result.parts[0].shell.area, 100.0);
    }
}
