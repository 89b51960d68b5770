use tracing::debug;

use super::{Chain, ChainId, NormalizeOptions};
use crate::{
    core::{math::Vector2, traits::Real},
    shape::ShapeId,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of defect found when walking a chain in order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TraversalIssueKind {
    /// Two shapes end at the same point.
    CoincidentEndpoints,
    /// Two shapes start at the same point.
    CoincidentStartpoints,
    /// Shapes that are not next to each other in the chain meet end to start.
    BrokenTraversal,
}

/// One defect between the shapes at `index_a < index_b`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalIssue<T = f64> {
    pub kind: TraversalIssueKind,
    pub index_a: usize,
    pub index_b: usize,
    pub shape_a: ShapeId,
    pub shape_b: ShapeId,
    pub point: Vector2<T>,
}

/// Result of [analyze_traversal] for one chain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalAnalysis<T = f64> {
    pub chain_id: ChainId,
    /// True when no issues were found.
    pub can_traverse: bool,
    pub issues: Vec<TraversalIssue<T>>,
}

/// Check whether `chain` can be walked start to end in its current order.
///
/// Every pair of shapes is compared, the connections `end(k) -> start(k + 1)` are expected, as is
/// `end(last) -> start(first)` which closes the chain. Any other coincidence of end points is
/// reported. Chains with fewer than two shapes are always traversable.
pub fn analyze_traversal<T>(chain: &Chain<T>, options: &NormalizeOptions<T>) -> TraversalAnalysis<T>
where
    T: Real,
{
    let tol = options.traversal_tolerance;
    let n = chain.len();
    let mut issues = Vec::new();

    if n >= 2 {
        let ends: Vec<_> = chain
            .shapes
            .iter()
            .map(|s| (s.start_point(), s.end_point()))
            .collect();
        let touching = |p: Vector2<T>, q: Vector2<T>| (p - q).length() < tol;

        for i in 0..n {
            for j in (i + 1)..n {
                let (start_i, end_i) = ends[i];
                let (start_j, end_j) = ends[j];
                let mut report = |kind, point| {
                    issues.push(TraversalIssue {
                        kind,
                        index_a: i,
                        index_b: j,
                        shape_a: chain.shapes[i].id.clone(),
                        shape_b: chain.shapes[j].id.clone(),
                        point,
                    })
                };

                if touching(end_i, end_j) {
                    report(TraversalIssueKind::CoincidentEndpoints, end_i);
                }
                if touching(start_i, start_j) {
                    report(TraversalIssueKind::CoincidentStartpoints, start_i);
                }

                let sequent = j == i + 1;
                if touching(end_i, start_j) && !sequent {
                    report(TraversalIssueKind::BrokenTraversal, end_i);
                }
                let closes_chain = i == 0 && j == n - 1;
                if touching(end_j, start_i) && !closes_chain {
                    report(TraversalIssueKind::BrokenTraversal, end_j);
                }
            }
        }
    }

    if !issues.is_empty() {
        debug!(chain = %chain.id, issue_count = issues.len(), "chain traversal issues");
    }

    TraversalAnalysis {
        chain_id: chain.id.clone(),
        can_traverse: issues.is_empty(),
        issues,
    }
}

/// [analyze_traversal] for every chain, chains are not modified.
pub fn analyze_chain_traversal<T>(
    chains: &[Chain<T>],
    options: &NormalizeOptions<T>,
) -> Vec<TraversalAnalysis<T>>
where
    T: Real,
{
    chains.iter().map(|c| analyze_traversal(c, options)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    fn line(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
        Shape::line(id, Vector2::new(x0, y0), Vector2::new(x1, y1))
    }

    #[test]
    fn closed_triangle_has_no_issues() {
        let chain = Chain::new(
            "t",
            vec![
                line("a", 0.0, 0.0, 4.0, 0.0),
                line("b", 4.0, 0.0, 0.0, 3.0),
                line("c", 0.0, 3.0, 0.0, 0.0),
            ],
        );
        let analysis = analyze_traversal(&chain, &NormalizeOptions::new());
        assert!(analysis.can_traverse);
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn opposing_shapes_are_reported() {
        // "b" runs backwards: ends where "a" ends and starts where "c" starts
        let chain = Chain::new(
            "t",
            vec![
                line("a", 0.0, 0.0, 1.0, 0.0),
                line("b", 2.0, 0.0, 1.0, 0.0),
                line("c", 2.0, 0.0, 3.0, 0.0),
            ],
        );
        let analysis = analyze_traversal(&chain, &NormalizeOptions::new());
        assert!(!analysis.can_traverse);
        let kinds: Vec<_> = analysis.issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            [
                TraversalIssueKind::CoincidentEndpoints,
                TraversalIssueKind::CoincidentStartpoints
            ]
        );
        assert_eq!(analysis.issues[0].shape_b.as_str(), "b");
        assert_eq!((analysis.issues[1].index_a, analysis.issues[1].index_b), (1, 2));
    }

    #[test]
    fn out_of_order_connection_is_broken() {
        let chain = Chain::new(
            "t",
            vec![
                line("a", 0.0, 0.0, 1.0, 0.0),
                line("c", 2.0, 0.0, 3.0, 0.0),
                line("b", 1.0, 0.0, 2.0, 0.0),
            ],
        );
        let analysis = analyze_chain_traversal(&[chain], &NormalizeOptions::new());
        assert_eq!(analysis.len(), 1);
        let broken: Vec<_> = analysis[0]
            .issues
            .iter()
            .filter(|i| i.kind == TraversalIssueKind::BrokenTraversal)
            .map(|i| (i.index_a, i.index_b))
            .collect();
        // a -> b skips c, b -> c runs backwards in order
        assert_eq!(broken, [(0, 2), (1, 2)]);
    }

    #[test]
    fn single_shape_is_traversable() {
        let chain = Chain::new("t", vec![Shape::circle("c", Vector2::new(0.0, 0.0), 1.0)]);
        assert!(analyze_traversal(&chain, &NormalizeOptions::new()).can_traverse);
    }
}
