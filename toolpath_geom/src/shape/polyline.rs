use static_aabb2d_index::AABB;

use super::{arc::Arc, extents};
use crate::core::{
    math::{
        angle, angle_from_bulge, angle_is_within_sweep_eps, clamp_unit, dist_squared, is_left,
        is_left_or_equal, line_seg_closest_point, point_from_parametric, point_on_circle, Vector2,
    },
    traits::Real,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A polyline vertex is represented by an `x`, `y`, and `bulge` value.
///
/// `bulge` describes the arc for the segment that starts at this vertex and is defined as
/// `tan(arc_sweep_angle / 4)`. Zero is a straight segment, positive is counter clockwise and
/// negative is clockwise. Any finite bulge is accepted (sweeps up to but not including a full
/// circle).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PlineVertex<T = f64> {
    pub x: T,
    pub y: T,
    pub bulge: T,
}

impl<T> PlineVertex<T>
where
    T: Real,
{
    #[inline]
    pub fn new(x: T, y: T, bulge: T) -> Self {
        PlineVertex { x, y, bulge }
    }

    #[inline]
    pub fn from_vector2(pos: Vector2<T>, bulge: T) -> Self {
        PlineVertex::new(pos.x, pos.y, bulge)
    }

    #[inline]
    pub fn pos(&self) -> Vector2<T> {
        Vector2::new(self.x, self.y)
    }

    #[inline]
    pub fn bulge_is_zero(&self) -> bool {
        self.bulge.fuzzy_eq_zero()
    }

    #[inline]
    pub fn bulge_is_neg(&self) -> bool {
        self.bulge < T::zero()
    }

    #[inline]
    pub fn bulge_is_pos(&self) -> bool {
        self.bulge > T::zero()
    }

    #[inline]
    pub fn with_bulge(&self, bulge: T) -> Self {
        PlineVertex::new(self.x, self.y, bulge)
    }
}

/// Get the arc radius and center of the segment `v1` to `v2`. Assumes `v1.bulge` is not zero
/// and the two positions differ.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::shape::*;
/// # use toolpath_geom::core::traits::*;
/// # use toolpath_geom::core::math::*;
/// // half circle from (0, 0) to (1, 0) counter clockwise
/// let v1 = PlineVertex::new(0.0, 0.0, 1.0);
/// let v2 = PlineVertex::new(1.0, 0.0, 0.0);
/// let (radius, center) = seg_arc_radius_and_center(v1, v2);
/// assert!(radius.fuzzy_eq(0.5));
/// assert!(center.fuzzy_eq(Vector2::new(0.5, 0.0)));
/// ```
pub fn seg_arc_radius_and_center<T>(v1: PlineVertex<T>, v2: PlineVertex<T>) -> (T, Vector2<T>)
where
    T: Real,
{
    let abs_bulge = v1.bulge.abs();
    let chord_v = v2.pos() - v1.pos();
    let chord_len = chord_v.length();
    let radius = chord_len * (abs_bulge * abs_bulge + T::one()) / (T::four() * abs_bulge);

    // signed distance from chord midpoint to center, negative once the sweep passes PI
    let s = abs_bulge * chord_len / T::two();
    let m = radius - s;
    let mut offs_x = -m * chord_v.y / chord_len;
    let mut offs_y = m * chord_v.x / chord_len;
    if v1.bulge_is_neg() {
        offs_x = -offs_x;
        offs_y = -offs_y;
    }

    let center = Vector2::new(
        v1.x + chord_v.x / T::two() + offs_x,
        v1.y + chord_v.y / T::two() + offs_y,
    );

    (radius, center)
}

/// Arc traced by segment `v1` to `v2`, `None` for line segments and zero length segments.
pub fn seg_arc<T>(v1: PlineVertex<T>, v2: PlineVertex<T>) -> Option<Arc<T>>
where
    T: Real,
{
    if v1.bulge_is_zero() || v1.pos().fuzzy_eq(v2.pos()) {
        return None;
    }

    let (radius, center) = seg_arc_radius_and_center(v1, v2);
    let start_angle = angle(center, v1.pos());
    let sweep = angle_from_bulge(v1.bulge);
    Some(Arc::new(
        center,
        radius,
        start_angle,
        start_angle + sweep,
        v1.bulge_is_neg(),
    ))
}

pub fn seg_length<T>(v1: PlineVertex<T>, v2: PlineVertex<T>) -> T
where
    T: Real,
{
    match seg_arc(v1, v2) {
        Some(arc) => arc.radius * angle_from_bulge(v1.bulge).abs(),
        None => (v2.pos() - v1.pos()).length(),
    }
}

/// Point along segment `v1` to `v2` at `fraction` of its sweep (arcs) or length (lines).
pub fn seg_point_at<T>(v1: PlineVertex<T>, v2: PlineVertex<T>, fraction: T) -> Vector2<T>
where
    T: Real,
{
    let f = clamp_unit(fraction);
    match seg_arc(v1, v2) {
        Some(arc) => point_on_circle(
            arc.radius,
            arc.center,
            arc.start_angle + f * angle_from_bulge(v1.bulge),
        ),
        None => point_from_parametric(v1.pos(), v2.pos(), f),
    }
}

/// Midpoint of the segment `v1` to `v2` (on the arc for arc segments).
///
/// # Examples
///
/// ```
/// # use toolpath_geom::shape::*;
/// # use toolpath_geom::core::math::*;
/// // counter clockwise half circle going from (2, 2) to (4, 2)
/// let v1 = PlineVertex::new(2.0, 2.0, 1.0);
/// let v2 = PlineVertex::new(4.0, 2.0, 0.0);
/// assert!(seg_midpoint(v1, v2).fuzzy_eq(Vector2::new(3.0, 1.0)));
/// ```
#[inline]
pub fn seg_midpoint<T>(v1: PlineVertex<T>, v2: PlineVertex<T>) -> Vector2<T>
where
    T: Real,
{
    seg_point_at(v1, v2, T::one() / T::two())
}

/// Splits an arc segment into two halves, returns the updated start vertex and the inserted
/// midpoint vertex (both carry the half sweep bulge).
pub fn seg_split_in_half<T>(
    v1: PlineVertex<T>,
    v2: PlineVertex<T>,
) -> (PlineVertex<T>, PlineVertex<T>)
where
    T: Real,
{
    if v1.bulge_is_zero() {
        let mid = seg_midpoint(v1, v2);
        return (v1, PlineVertex::from_vector2(mid, T::zero()));
    }

    let half_bulge = (angle_from_bulge(v1.bulge) / (T::four() + T::four())).tan();
    let mid = seg_midpoint(v1, v2);
    (
        v1.with_bulge(half_bulge),
        PlineVertex::from_vector2(mid, half_bulge),
    )
}

pub fn seg_bounding_box<T>(v1: PlineVertex<T>, v2: PlineVertex<T>) -> AABB<T>
where
    T: Real,
{
    match seg_arc(v1, v2) {
        Some(arc) => {
            extents::arc_extents(arc.center, arc.radius, arc.start_angle, arc.sweep_angle())
        }
        None => extents::include_point(&extents::point_extents(v1.pos()), v2.pos()),
    }
}

/// Closest point on segment `v1` to `v2` to `point`.
pub fn seg_closest_point<T>(v1: PlineVertex<T>, v2: PlineVertex<T>, point: Vector2<T>) -> Vector2<T>
where
    T: Real,
{
    let arc = match seg_arc(v1, v2) {
        Some(arc) => arc,
        None => return line_seg_closest_point(v1.pos(), v2.pos(), point),
    };

    if point.fuzzy_eq(arc.center) {
        return v1.pos();
    }

    let point_angle = angle(arc.center, point);
    let eps = T::fuzzy_epsilon();
    if angle_is_within_sweep_eps(point_angle, arc.start_angle, arc.sweep_angle(), eps) {
        return arc.center + (point - arc.center).normalize().scale(arc.radius);
    }

    if dist_squared(v1.pos(), point) < dist_squared(v2.pos(), point) {
        v1.pos()
    } else {
        v2.pos()
    }
}

/// Polyline made of line and arc segments.
///
/// A closed polyline has an implicit segment from the last vertex back to the first, its start
/// and end point are both the first vertex.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline<T = f64> {
    pub vertexes: Vec<PlineVertex<T>>,
    pub is_closed: bool,
}

impl<T> Polyline<T>
where
    T: Real,
{
    #[inline]
    pub fn new(is_closed: bool) -> Self {
        Polyline {
            vertexes: Vec::new(),
            is_closed,
        }
    }

    #[inline]
    pub fn with_capacity(capacity: usize, is_closed: bool) -> Self {
        Polyline {
            vertexes: Vec::with_capacity(capacity),
            is_closed,
        }
    }

    #[inline]
    pub fn from_vertexes(vertexes: Vec<PlineVertex<T>>, is_closed: bool) -> Self {
        Polyline {
            vertexes,
            is_closed,
        }
    }

    #[inline]
    pub fn add(&mut self, x: T, y: T, bulge: T) {
        self.vertexes.push(PlineVertex::new(x, y, bulge));
    }

    #[inline]
    pub fn add_vertex(&mut self, vertex: PlineVertex<T>) {
        self.vertexes.push(vertex);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertexes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertexes.is_empty()
    }

    /// Number of segments, includes the closing segment for closed polylines.
    pub fn segment_count(&self) -> usize {
        let n = self.vertexes.len();
        if n < 2 {
            0
        } else if self.is_closed {
            n
        } else {
            n - 1
        }
    }

    /// Iterate the segments as `(start, end)` vertex pairs.
    pub fn iter_segments(&self) -> impl Iterator<Item = (PlineVertex<T>, PlineVertex<T>)> + '_ {
        let n = self.vertexes.len();
        (0..self.segment_count()).map(move |i| (self.vertexes[i], self.vertexes[(i + 1) % n]))
    }

    pub fn start_point(&self) -> Option<Vector2<T>> {
        self.vertexes.first().map(|v| v.pos())
    }

    pub fn end_point(&self) -> Option<Vector2<T>> {
        if self.is_closed {
            self.start_point()
        } else {
            self.vertexes.last().map(|v| v.pos())
        }
    }

    pub fn length(&self) -> T {
        self.iter_segments()
            .fold(T::zero(), |acc, (v1, v2)| acc + seg_length(v1, v2))
    }

    /// Point at `t` in `[0, 1]` (clamped) of the total path length.
    pub fn point_at(&self, t: T) -> Option<Vector2<T>> {
        let first = self.start_point()?;
        let total = self.length();
        if !(total > T::zero()) {
            return Some(first);
        }

        let target = clamp_unit(t) * total;
        let mut traveled = T::zero();
        let mut last = first;
        for (v1, v2) in self.iter_segments() {
            let len = seg_length(v1, v2);
            if len > T::zero() && traveled + len >= target {
                return Some(seg_point_at(v1, v2, (target - traveled) / len));
            }
            traveled = traveled + len;
            last = v2.pos();
        }

        Some(last)
    }

    /// Same path traveled in the opposite direction.
    ///
    /// Open polylines reverse their vertex order. Closed polylines keep the first vertex so the
    /// start point is unchanged. Bulges move to the new segment start and flip sign.
    ///
    /// # Examples
    ///
    /// ```
    /// # use toolpath_geom::shape::*;
    /// # use toolpath_geom::core::math::*;
    /// let mut pline = Polyline::new(false);
    /// pline.add(0.0, 0.0, 0.5);
    /// pline.add(2.0, 0.0, 0.0);
    /// pline.add(2.0, 2.0, 0.0);
    /// let rev = pline.reversed();
    /// assert_eq!(rev.vertexes[0], PlineVertex::new(2.0, 2.0, 0.0));
    /// assert_eq!(rev.vertexes[1], PlineVertex::new(2.0, 0.0, -0.5));
    /// assert_eq!(rev.vertexes[2], PlineVertex::new(0.0, 0.0, 0.0));
    /// assert_eq!(rev.reversed(), pline);
    /// ```
    pub fn reversed(&self) -> Self {
        let n = self.vertexes.len();
        if n < 2 {
            return self.clone();
        }

        let v = &self.vertexes;
        let vertexes = if self.is_closed {
            (0..n)
                .map(|k| {
                    let pos_idx = (n - k) % n;
                    let bulge_idx = (2 * n - k - 1) % n;
                    v[pos_idx].with_bulge(-v[bulge_idx].bulge)
                })
                .collect()
        } else {
            (0..n)
                .map(|k| {
                    let pos_idx = n - 1 - k;
                    let bulge_idx = if k < n - 1 { n - 2 - k } else { n - 1 };
                    v[pos_idx].with_bulge(-v[bulge_idx].bulge)
                })
                .collect()
        };

        Polyline::from_vertexes(vertexes, self.is_closed)
    }

    pub fn bounding_box(&self) -> Option<AABB<T>> {
        let first = self.start_point()?;
        Some(
            self.iter_segments()
                .fold(extents::point_extents(first), |acc, (v1, v2)| {
                    extents::union(&acc, &seg_bounding_box(v1, v2))
                }),
        )
    }

    /// Signed area of a closed polyline, positive for counter clockwise. Open polylines return 0.
    ///
    /// # Examples
    ///
    /// ```
    /// # use toolpath_geom::shape::*;
    /// # use toolpath_geom::core::traits::*;
    /// let mut circle = Polyline::new(true);
    /// circle.add(0.0, 0.0, 1.0);
    /// circle.add(2.0, 0.0, 1.0);
    /// assert!(circle.area().fuzzy_eq(std::f64::consts::PI));
    /// ```
    pub fn area(&self) -> T {
        if !self.is_closed {
            return T::zero();
        }

        // shoelace formula plus the circular segment area of each arc
        let mut double_total_area = T::zero();
        for (v1, v2) in self.iter_segments() {
            double_total_area = double_total_area + v1.x * v2.y - v1.y * v2.x;
            if let Some(arc) = seg_arc(v1, v2) {
                let sweep = angle_from_bulge(v1.bulge);
                let r2 = arc.radius * arc.radius;
                // sector minus triangle, both signed by the sweep
                let double_arc_area = r2 * (sweep - sweep.sin());
                double_total_area = double_total_area + double_arc_area;
            }
        }

        double_total_area / T::two()
    }

    /// Winding number of `point` relative to the closed polyline, 0 for open polylines.
    ///
    /// Undefined (any integer) when the point lies on the path, use [Polyline::distance_to] to
    /// detect that case first.
    pub fn winding_number(&self, point: Vector2<T>) -> i32 {
        if !self.is_closed || self.vertexes.len() < 2 {
            return 0;
        }

        let mut winding = 0;
        for (v1, v2) in self.iter_segments() {
            if v1.bulge_is_zero() {
                winding += line_winding(v1, v2, point);
            } else if v1.bulge.abs() > T::one() {
                // arc crossing tests below hold for sweeps up to a half circle
                let (a, mid) = seg_split_in_half(v1, v2);
                winding += arc_winding(a, mid, point);
                winding += arc_winding(mid, v2, point);
            } else {
                winding += arc_winding(v1, v2, point);
            }
        }

        winding
    }

    /// Shortest distance from `point` to the polyline path.
    pub fn distance_to(&self, point: Vector2<T>) -> Option<T> {
        let first = self.start_point()?;
        if self.vertexes.len() == 1 {
            return Some((first - point).length());
        }

        let far = <T as num_traits::Bounded>::max_value();
        let dist2 = self.iter_segments().fold(far, |acc, (v1, v2)| {
            let cp = seg_closest_point(v1, v2, point);
            num_traits::real::Real::min(acc, dist_squared(cp, point))
        });

        Some(dist2.sqrt())
    }
}

fn line_winding<T>(v1: PlineVertex<T>, v2: PlineVertex<T>, point: Vector2<T>) -> i32
where
    T: Real,
{
    if v1.y <= point.y {
        if v2.y > point.y && is_left(v1.pos(), v2.pos(), point) {
            // left and upward crossing
            return 1;
        }
    } else if v2.y <= point.y && !is_left(v1.pos(), v2.pos(), point) {
        // right and downward crossing
        return -1;
    }

    0
}

fn arc_winding<T>(v1: PlineVertex<T>, v2: PlineVertex<T>, point: Vector2<T>) -> i32
where
    T: Real,
{
    let is_ccw = v1.bulge_is_pos();
    let point_is_left = if is_ccw {
        is_left(v1.pos(), v2.pos(), point)
    } else {
        is_left_or_equal(v1.pos(), v2.pos(), point)
    };

    let inside_circle = || {
        let (radius, center) = seg_arc_radius_and_center(v1, v2);
        dist_squared(center, point) < radius * radius
    };

    if v1.y <= point.y {
        if v2.y > point.y {
            // upward crossing of the chord
            if is_ccw {
                if point_is_left || inside_circle() {
                    return 1;
                }
            } else if point_is_left && !inside_circle() {
                return 1;
            }
        } else if is_ccw && !point_is_left && v2.x < point.x && point.x < v1.x && inside_circle()
        {
            // chord below, point in the arc bulge
            return 1;
        } else if !is_ccw && point_is_left && v1.x < point.x && point.x < v2.x && inside_circle()
        {
            return -1;
        }
    } else if v2.y <= point.y {
        // downward crossing of the chord
        if is_ccw {
            if !point_is_left && !inside_circle() {
                return -1;
            }
        } else if !point_is_left || inside_circle() {
            return -1;
        }
    } else if is_ccw && !point_is_left && v1.x < point.x && point.x < v2.x && inside_circle() {
        // chord above, point in the arc bulge
        return 1;
    } else if !is_ccw && point_is_left && v2.x < point.x && point.x < v1.x && inside_circle() {
        return -1;
    }

    0
}
