use static_aabb2d_index::AABB;

use crate::{
    core::{math::Vector2, traits::Real},
    shape::{extents, seg_midpoint, Polyline},
};

/// A closed chain prepared for containment tests.
#[derive(Debug, Clone)]
pub(crate) struct Region<T: Real> {
    pub chain_index: usize,
    pub boundary: Polyline<T>,
    pub bbox: AABB<T>,
    /// Absolute enclosed area.
    pub area: T,
    /// Boundary vertexes and segment midpoints.
    pub samples: Vec<Vector2<T>>,
}

impl<T> Region<T>
where
    T: Real,
{
    pub fn new(chain_index: usize, boundary: Polyline<T>) -> Option<Self> {
        let bbox = boundary.bounding_box()?;
        let area = boundary.area().abs();
        let mut samples = Vec::with_capacity(boundary.vertex_count() * 2);
        for (v1, v2) in boundary.iter_segments() {
            samples.push(v1.pos());
            samples.push(seg_midpoint(v1, v2));
        }

        Some(Region {
            chain_index,
            boundary,
            bbox,
            area,
            samples,
        })
    }

    /// Returns true if `inner` lies inside this region.
    ///
    /// Requires extents containment, a strictly smaller area and every sample of `inner` inside
    /// or on (within `epsilon`) this boundary with at least one sample strictly inside. Regions
    /// never contain themselves or a copy of themselves.
    pub fn contains(&self, inner: &Region<T>, epsilon: T) -> bool {
        if !extents::contains(&self.bbox, &inner.bbox, epsilon) {
            return false;
        }

        if !(inner.area < self.area) {
            return false;
        }

        let mut strictly_inside = false;
        for &p in &inner.samples {
            let on_boundary = self
                .boundary
                .distance_to(p)
                .map_or(false, |d| d <= epsilon);
            if on_boundary {
                continue;
            }
            if self.boundary.winding_number(p) == 0 {
                return false;
            }
            strictly_inside = true;
        }

        strictly_inside
    }
}

/// Index of the smallest region containing each region, `None` for roots.
pub(crate) fn parents<T>(regions: &[Region<T>], epsilon: T) -> Vec<Option<usize>>
where
    T: Real,
{
    let grown: Vec<_> = regions
        .iter()
        .map(|r| extents::expanded(&r.bbox, epsilon))
        .collect();
    let index = extents::build_index(&grown);

    regions
        .iter()
        .enumerate()
        .map(|(i, inner)| {
            let bb = &inner.bbox;
            let mut candidates = index.query(bb.min_x, bb.min_y, bb.max_x, bb.max_y);
            candidates.sort_unstable();
            candidates
                .into_iter()
                .filter(|&j| j != i && regions[j].contains(inner, epsilon))
                .fold(None, |best: Option<usize>, j| match best {
                    Some(b) if regions[b].area <= regions[j].area => Some(b),
                    _ => Some(j),
                })
        })
        .collect()
}

/// Nesting depth of every region given its parent links.
///
/// Walks each parent chain iteratively, a walk longer than the region count means the links
/// form a cycle and stops there.
pub(crate) fn nesting_levels(parents: &[Option<usize>]) -> Vec<usize> {
    let n = parents.len();
    (0..n)
        .map(|i| {
            let mut level = 0;
            let mut current = parents[i];
            while let Some(p) = current {
                level += 1;
                if level > n {
                    break;
                }
                current = parents[p];
            }
            level
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(index: usize, min: f64, max: f64) -> Region<f64> {
        let pl = pline_closed![(min, min, 0.0), (max, min, 0.0), (max, max, 0.0), (min, max, 0.0)];
        Region::new(index, pl).unwrap()
    }

    #[test]
    fn nested_squares() {
        let regions = vec![square(0, 30.0, 70.0), square(1, 0.0, 100.0), square(2, 10.0, 90.0)];
        let parents = parents(&regions, 1e-6);
        assert_eq!(parents, vec![Some(2), None, Some(1)]);
        assert_eq!(nesting_levels(&parents), vec![2, 0, 1]);
    }

    #[test]
    fn identical_regions_do_not_contain_each_other() {
        let a = square(0, 0.0, 10.0);
        let b = square(1, 0.0, 10.0);
        assert!(!a.contains(&b, 1e-6));
        assert!(!b.contains(&a, 1e-6));
    }

    #[test]
    fn touching_inner_square_is_contained() {
        // shares the left edge with the outer square
        let outer = square(0, 0.0, 10.0);
        let inner = Region::new(
            1,
            pline_closed![(0.0, 2.0, 0.0), (5.0, 2.0, 0.0), (5.0, 8.0, 0.0), (0.0, 8.0, 0.0)],
        )
        .unwrap();
        assert!(outer.contains(&inner, 1e-6));
    }

    #[test]
    fn overlapping_square_is_not_contained() {
        let outer = square(0, 0.0, 10.0);
        let other = square(1, 5.0, 12.0);
        assert!(!outer.contains(&other, 1e-6));
    }

    #[test]
    fn concave_outer_rejects_notch_region() {
        // U shape, the small square sits in the notch
        let u = Region::new(
            0,
            pline_closed![
                (0.0, 0.0, 0.0),
                (10.0, 0.0, 0.0),
                (10.0, 10.0, 0.0),
                (7.0, 10.0, 0.0),
                (7.0, 3.0, 0.0),
                (3.0, 3.0, 0.0),
                (3.0, 10.0, 0.0),
                (0.0, 10.0, 0.0)
            ],
        )
        .unwrap();
        let notch = square(1, 4.0, 6.0);
        assert!(!u.contains(&notch, 1e-6));
    }

    #[test]
    fn cyclic_links_terminate() {
        let levels = nesting_levels(&[Some(1), Some(0), None]);
        assert_eq!(levels[2], 0);
        assert!(levels[0] > 2);
    }
}
