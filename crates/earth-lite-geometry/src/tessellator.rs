// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon fill tessellation on the ellipsoid
//!
//! A polygon's rings are projected to ECEF, flattened onto the plane facing
//! the exterior's centroid, cleaned, checked and triangulated. The triangles
//! reference the projected ECEF points themselves, so no Cartesian coordinate
//! is invented.

use crate::triangulation::{
    calculate_polygon_normal, clean_ring, extent, project_to_2d, project_to_2d_with_basis,
    rings_self_intersect, signed_area, triangulate_polygon_with_holes,
};
use crate::{Error, Point2, Point3, Result, Vector3};
use earth_lite_model::{
    CartesianPoint, DegenerateGeometryWarning, DegenerateReason, Ellipsoid, Polygon, Ring,
};
use serde::{Deserialize, Serialize};

/// Tessellation tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationOptions {
    /// Sine of the turn angle below which a vertex counts as collinear
    pub collinear_tolerance: f64,
    /// Ring area below which a ring counts as empty, relative to the squared
    /// extent of the exterior
    pub area_tolerance: f64,
    /// Whether crossing or overlapping edges make a polygon degenerate
    pub reject_self_intersections: bool,
}

impl Default for TessellationOptions {
    fn default() -> Self {
        Self {
            collinear_tolerance: 1e-9,
            area_tolerance: 1e-12,
            reject_self_intersections: true,
        }
    }
}

impl TessellationOptions {
    /// Set the collinear tolerance
    pub fn with_collinear_tolerance(mut self, tolerance: f64) -> Self {
        self.collinear_tolerance = tolerance;
        self
    }

    /// Set the area tolerance
    pub fn with_area_tolerance(mut self, tolerance: f64) -> Self {
        self.area_tolerance = tolerance;
        self
    }

    /// Set whether self-intersecting polygons are rejected
    pub fn with_self_intersection_check(mut self, enabled: bool) -> Self {
        self.reject_self_intersections = enabled;
        self
    }

    /// Check every tolerance is finite and within [0, 1)
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("collinear_tolerance", self.collinear_tolerance),
            ("area_tolerance", self.area_tolerance),
        ] {
            if !value.is_finite() || !(0.0..1.0).contains(&value) {
                return Err(Error::invalid_option(
                    name,
                    format!("{} is not in [0, 1)", value),
                ));
            }
        }
        Ok(())
    }
}

/// A ring after cleanup: ECEF points and their planar coordinates
struct PlanarRing {
    points: Vec<CartesianPoint>,
    planar: Vec<Point2<f64>>,
}

/// Fills polygons with outward-facing triangles
#[derive(Clone, Debug, Default)]
pub struct Tessellator {
    ellipsoid: Ellipsoid,
    options: TessellationOptions,
}

impl Tessellator {
    /// Create a tessellator on WGS84
    pub fn new(options: TessellationOptions) -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            options,
        }
    }

    /// Use another reference ellipsoid
    pub fn with_ellipsoid(mut self, ellipsoid: Ellipsoid) -> Self {
        self.ellipsoid = ellipsoid;
        self
    }

    pub fn options(&self) -> &TessellationOptions {
        &self.options
    }

    /// Tessellate a polygon's fill at altitude 0
    ///
    /// # Returns
    /// A flat triangle list (length a multiple of 3), every triangle wound so
    /// its normal points away from the Earth's center, or the reason the
    /// polygon cannot be filled
    pub fn tessellate(
        &self,
        polygon: &Polygon,
    ) -> std::result::Result<Vec<CartesianPoint>, DegenerateGeometryWarning> {
        let exterior = self.project_ring(polygon.exterior());
        if exterior.len() < 3 {
            return Err(DegenerateGeometryWarning::too_few_points(exterior.len()));
        }

        let exterior_3d: Vec<Point3<f64>> = exterior.iter().map(|p| *p.as_point()).collect();
        let normal = plane_normal(&exterior_3d)
            .ok_or_else(|| DegenerateGeometryWarning::new(DegenerateReason::ZeroArea))?;
        let (exterior_2d, u_axis, v_axis, origin) = project_to_2d(&exterior_3d, &normal);

        let scale = extent(&exterior_2d);
        let outer = self
            .clean(exterior, exterior_2d, scale)
            .map_err(DegenerateGeometryWarning::new)?;

        let mut holes = Vec::with_capacity(polygon.holes().len());
        for (i, ring) in polygon.holes().iter().enumerate() {
            let points = self.project_ring(ring);
            let points_3d: Vec<Point3<f64>> = points.iter().map(|p| *p.as_point()).collect();
            let planar = project_to_2d_with_basis(&points_3d, &u_axis, &v_axis, &origin);

            match self.clean(points, planar, scale) {
                Ok(hole) => holes.push(hole),
                Err(reason) => {
                    log::debug!("{}: dropping hole {} ({})", polygon.origin(), i, reason);
                }
            }
        }

        if self.options.reject_self_intersections {
            let rings: Vec<Vec<Point2<f64>>> = std::iter::once(&outer)
                .chain(holes.iter())
                .map(|r| r.planar.clone())
                .collect();
            if rings_self_intersect(&rings) {
                return Err(DegenerateGeometryWarning::new(
                    DegenerateReason::SelfIntersecting,
                ));
            }
        }

        let hole_planar: Vec<Vec<Point2<f64>>> = holes.iter().map(|h| h.planar.clone()).collect();
        let indices = triangulate_polygon_with_holes(&outer.planar, &hole_planar)
            .map_err(|e| DegenerateGeometryWarning::triangulation(e.to_string()))?;

        if indices.is_empty() {
            return Err(DegenerateGeometryWarning::triangulation(
                "no triangles produced",
            ));
        }

        let vertices: Vec<CartesianPoint> = outer
            .points
            .into_iter()
            .chain(holes.into_iter().flat_map(|h| h.points))
            .collect();

        let mut triangles = Vec::with_capacity(indices.len());
        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]);
            if faces_inward(&a, &b, &c) {
                triangles.extend_from_slice(&[a, c, b]);
            } else {
                triangles.extend_from_slice(&[a, b, c]);
            }
        }

        Ok(triangles)
    }

    /// Project a ring's points at altitude 0
    fn project_ring(&self, ring: &Ring) -> Vec<CartesianPoint> {
        ring.points()
            .iter()
            .map(|p| self.ellipsoid.project_at(p, 0.0))
            .collect()
    }

    /// Clean a ring in the plane and check it still encloses area
    fn clean(
        &self,
        points: Vec<CartesianPoint>,
        planar: Vec<Point2<f64>>,
        scale: f64,
    ) -> std::result::Result<PlanarRing, DegenerateReason> {
        let kept = clean_ring(&planar, self.options.collinear_tolerance, scale);
        if kept.len() < 3 {
            return Err(DegenerateReason::TooFewPoints(kept.len()));
        }

        let ring = PlanarRing {
            points: kept.iter().map(|&i| points[i]).collect(),
            planar: kept.iter().map(|&i| planar[i]).collect(),
        };

        if signed_area(&ring.planar).abs() <= self.options.area_tolerance * scale * scale {
            return Err(DegenerateReason::ZeroArea);
        }

        Ok(ring)
    }
}

/// Normal of the plane rings are flattened onto
///
/// The outward direction at the ring's centroid, so rings are seen from above
/// whatever their winding. Rings whose centroid sits at the Earth's center
/// (spanning the whole globe) fall back to the Newell normal.
fn plane_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f64>, p| acc + p.coords);
    let centroid = sum / points.len() as f64;
    centroid
        .try_normalize(1e-9)
        .or_else(|| calculate_polygon_normal(points))
}

/// Whether triangle (a, b, c) has its normal pointing towards the Earth's center
#[inline]
fn faces_inward(a: &CartesianPoint, b: &CartesianPoint, c: &CartesianPoint) -> bool {
    let (a, b, c) = (a.to_vector(), b.to_vector(), c.to_vector());
    (b - a).cross(&(c - a)).dot(&(a + b + c)) < 0.0
}

/// Tessellate with default options on WGS84
pub fn tessellate(
    polygon: &Polygon,
) -> std::result::Result<Vec<CartesianPoint>, DegenerateGeometryWarning> {
    Tessellator::default().tessellate(polygon)
}
