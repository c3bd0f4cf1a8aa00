// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Planar building blocks for the tessellator: plane fitting, ring cleanup,
//! self-intersection detection and the earcutr wrapper.

use crate::{Error, Point2, Point3, Result, Vector3};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross != 0.0 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::triangulation(
            "Need at least 3 points to triangulate",
        ));
    }

    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // Convex rings are fanned, anything else goes through earcut
    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    earcutr::earcut(&vertices, &[], 2).map_err(|e| Error::triangulation(format!("{:?}", e)))
}

/// Triangulate a polygon with holes
/// Returns triangle indices into the combined vertex array (outer + all holes)
#[inline]
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::triangulation(
            "Need at least 3 points in outer boundary",
        ));
    }

    if holes.iter().any(|h| h.len() < 3) {
        return Err(Error::triangulation("Hole with fewer than 3 points"));
    }

    if holes.is_empty() {
        return triangulate_polygon(outer);
    }

    let total_points: usize = outer.len() + holes.iter().map(Vec::len).sum::<usize>();
    let mut vertices = Vec::with_capacity(total_points * 2);

    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::triangulation(format!("{:?}", e)))
}

/// Project 3D points onto a 2D plane defined by a normal
/// Returns 2D points and the coordinate system (u_axis, v_axis, origin)
#[inline]
pub fn project_to_2d(
    points_3d: &[Point3<f64>],
    normal: &Vector3<f64>,
) -> (Vec<Point2<f64>>, Vector3<f64>, Vector3<f64>, Point3<f64>) {
    if points_3d.is_empty() {
        return (
            Vec::new(),
            Vector3::zeros(),
            Vector3::zeros(),
            Point3::origin(),
        );
    }

    let origin = points_3d[0];

    // Orthonormal basis on the plane
    let abs_x = normal.x.abs();
    let abs_y = normal.y.abs();
    let abs_z = normal.z.abs();

    let reference = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::new(1.0, 0.0, 0.0)
    } else if abs_y <= abs_z {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    let u_axis = normal.cross(&reference).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    let points_2d = project_to_2d_with_basis(points_3d, &u_axis, &v_axis, &origin);

    (points_2d, u_axis, v_axis, origin)
}

/// Project 3D points using an existing coordinate system
#[inline]
pub fn project_to_2d_with_basis(
    points_3d: &[Point3<f64>],
    u_axis: &Vector3<f64>,
    v_axis: &Vector3<f64>,
    origin: &Point3<f64>,
) -> Vec<Point2<f64>> {
    points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(u_axis), v.dot(v_axis))
        })
        .collect()
}

/// Calculate the unit normal of a polygon from its vertices (Newell's method)
///
/// Returns `None` when the vertices span no area.
#[inline]
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let n = points.len();

    if n < 3 {
        return None;
    }

    let mut normal = Vector3::<f64>::zeros();

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal.try_normalize(0.0)
}

/// Largest side of the 2D bounding box
pub fn extent(points: &[Point2<f64>]) -> f64 {
    let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    if points.is_empty() {
        0.0
    } else {
        (max.x - min.x).max(max.y - min.y)
    }
}

/// Signed area of a ring (shoelace), positive when counter-clockwise
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    twice * 0.5
}

/// Clean a ring in the plane
///
/// Drops points that duplicate their predecessor or lie on the line through
/// their neighbours, repeating until nothing changes. A point is collinear
/// when the sine of the turn angle at it is at most `tolerance`; duplicates
/// are points closer than `tolerance * scale` to the previous kept point.
///
/// # Returns
/// Indices of the kept points, in ring order
pub fn clean_ring(points: &[Point2<f64>], tolerance: f64, scale: f64) -> Vec<usize> {
    let min_dist = tolerance * scale;
    let mut keep: Vec<usize> = (0..points.len()).collect();

    while keep.len() >= 3 {
        let m = keep.len();
        let mut out: Vec<usize> = Vec::with_capacity(m);

        for k in 0..m {
            let cur = keep[k];
            let prev = out.last().copied().unwrap_or(keep[m - 1]);
            let next = keep[(k + 1) % m];

            let d1 = points[cur] - points[prev];
            let d2 = points[next] - points[cur];
            let (l1, l2) = (d1.norm(), d2.norm());

            if l1 <= min_dist {
                continue;
            }
            if l2 > min_dist && (d1.perp(&d2)).abs() <= tolerance * l1 * l2 {
                continue;
            }
            out.push(cur);
        }

        if out.len() == m {
            break;
        }
        keep = out;
    }

    keep
}

/// One ring edge tagged with its ring and position
struct Edge {
    ring: usize,
    index: usize,
    len: usize,
    line: Line<f64>,
    min: Coord<f64>,
    max: Coord<f64>,
}

impl Edge {
    fn adjacent(&self, other: &Edge) -> bool {
        self.ring == other.ring
            && ((self.index + 1) % self.len == other.index
                || (other.index + 1) % other.len == self.index)
    }
}

/// Check whether any two edges of the rings cross or overlap
///
/// Edges sharing a vertex in the same ring only count when they overlap
/// along a segment. Other edges count when they cross properly or overlap;
/// touching at a single point is allowed.
pub fn rings_self_intersect(rings: &[Vec<Point2<f64>>]) -> bool {
    let mut edges = Vec::new();
    for (r, ring) in rings.iter().enumerate() {
        let n = ring.len();
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            edges.push(Edge {
                ring: r,
                index: i,
                len: n,
                line: Line::new(Coord { x: a.x, y: a.y }, Coord { x: b.x, y: b.y }),
                min: Coord {
                    x: a.x.min(b.x),
                    y: a.y.min(b.y),
                },
                max: Coord {
                    x: a.x.max(b.x),
                    y: a.y.max(b.y),
                },
            });
        }
    }

    edges.sort_by(|a, b| a.min.x.total_cmp(&b.min.x));

    for (i, e) in edges.iter().enumerate() {
        for f in &edges[i + 1..] {
            if f.min.x > e.max.x {
                break;
            }
            if f.min.y > e.max.y || f.max.y < e.min.y {
                continue;
            }

            match line_intersection(e.line, f.line) {
                Some(LineIntersection::Collinear { .. }) => return true,
                Some(LineIntersection::SinglePoint { is_proper, .. }) => {
                    if is_proper && !e.adjacent(f) {
                        return true;
                    }
                }
                None => {}
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn test_triangulate_square() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn test_triangulate_triangle() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (0.5, 1.0)]);
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 3);
    }

    #[test]
    fn test_triangulate_concave_polygon() {
        // L-shape: 6 vertices, 4 triangles
        let points = pts(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]);
        assert!(!is_convex(&points));
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 12);
    }

    #[test]
    fn test_triangulate_with_hole() {
        let outer = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let hole = pts(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]);
        let indices = triangulate_polygon_with_holes(&outer, &[hole]).unwrap();
        // 8 vertices, one hole: 8 triangles
        assert_eq!(indices.len(), 24);
    }

    #[test]
    fn test_calculate_polygon_normal() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];

        let normal = calculate_polygon_normal(&points).unwrap();
        assert_relative_eq!(normal.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_of_collinear_points_is_none() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        ];
        assert!(calculate_polygon_normal(&points).is_none());
    }

    #[test]
    fn test_signed_area() {
        let ccw = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        assert_relative_eq!(signed_area(&ccw), 4.0);
        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert_relative_eq!(signed_area(&cw), -4.0);
    }

    #[test]
    fn test_clean_ring_drops_duplicates_and_collinear() {
        let points = pts(&[
            (0.0, 0.0),
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (0.0, 2.0),
        ]);
        let kept = clean_ring(&points, 1e-9, 2.0);
        assert_eq!(kept, vec![0, 3, 4, 5]);
    }

    #[test]
    fn test_clean_ring_collapses_line() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        assert!(clean_ring(&points, 1e-9, 3.0).len() < 3);
    }

    #[test]
    fn test_bowtie_self_intersects() {
        let bowtie = pts(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        assert!(rings_self_intersect(&[bowtie]));
    }

    #[test]
    fn test_simple_ring_does_not_self_intersect() {
        let square = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let hole = pts(&[(0.25, 0.25), (0.25, 0.75), (0.75, 0.75), (0.75, 0.25)]);
        assert!(!rings_self_intersect(&[square, hole]));
    }

    #[test]
    fn test_hole_crossing_exterior_intersects() {
        let square = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let hole = pts(&[(0.5, 0.5), (0.5, 1.5), (0.75, 1.5), (0.75, 0.5)]);
        assert!(rings_self_intersect(&[square, hole]));
    }
}
