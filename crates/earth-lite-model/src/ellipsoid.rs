// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WGS84 ellipsoid model and LLH → ECEF projection
//!
//! All Cartesian output is in millions of meters, so the rendered globe has a
//! radius of roughly 6.37 scene units.

use crate::{DomainError, GeodeticPoint};
use nalgebra::{Point3, Vector3};

/// Scene units per meter (output is in millions of meters)
pub const SCENE_UNITS_PER_METER: f64 = 1.0e-6;

/// Reference ellipsoid
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Ellipsoid {
    /// Semi-major axis in meters
    pub semi_major_axis: f64,
    /// Inverse flattening (1/f)
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    /// WGS84 reference ellipsoid
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_378_137.0,
        inverse_flattening: 298.257_223_563,
    };

    /// Flattening f = 1 / inverse_flattening
    #[inline]
    pub fn flattening(&self) -> f64 {
        1.0 / self.inverse_flattening
    }

    /// First eccentricity squared e² = 1 − (1 − f)²
    #[inline]
    pub fn eccentricity_squared(&self) -> f64 {
        let f = self.flattening();
        1.0 - (1.0 - f) * (1.0 - f)
    }

    /// Prime-vertical radius of curvature at a latitude (radians), in meters
    #[inline]
    pub fn prime_vertical_radius(&self, lat_rad: f64) -> f64 {
        let sin_lat = lat_rad.sin();
        self.semi_major_axis / (1.0 - self.eccentricity_squared() * sin_lat * sin_lat).sqrt()
    }

    /// Project a validated point using its own altitude
    #[inline]
    pub fn project(&self, point: &GeodeticPoint) -> CartesianPoint {
        self.project_at(point, point.alt())
    }

    /// Project a validated point at an overriding altitude (meters)
    pub fn project_at(&self, point: &GeodeticPoint, alt: f64) -> CartesianPoint {
        let lat = point.lat().to_radians();
        let lon = point.lon().to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        let e2 = self.eccentricity_squared();
        let v = self.prime_vertical_radius(lat);

        let x = (v + alt) * cos_lat * cos_lon;
        let y = (v + alt) * cos_lat * sin_lon;
        let z = (v * (1.0 - e2) + alt) * sin_lat;

        CartesianPoint(Point3::new(
            x * SCENE_UNITS_PER_METER,
            y * SCENE_UNITS_PER_METER,
            z * SCENE_UNITS_PER_METER,
        ))
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

/// Project (lat°, lon°, alt m) on the WGS84 ellipsoid
///
/// Out-of-range or non-finite input is rejected with a [`DomainError`].
pub fn project(lat: f64, lon: f64, alt: f64) -> Result<CartesianPoint, DomainError> {
    let point = GeodeticPoint::new(lon, lat, alt)?;
    Ok(Ellipsoid::WGS84.project(&point))
}

/// Earth-centered Cartesian point in millions of meters
///
/// Only [`Ellipsoid`] constructs these; the rest of the pipeline copies,
/// reorders and reads them.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CartesianPoint(Point3<f64>);

impl CartesianPoint {
    #[inline]
    pub fn x(&self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.0.y
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// Underlying nalgebra point
    #[inline]
    pub fn as_point(&self) -> &Point3<f64> {
        &self.0
    }

    /// Position vector from the Earth's center
    #[inline]
    pub fn to_vector(&self) -> Vector3<f64> {
        self.0.coords
    }

    /// Single-precision components for GPU upload
    #[inline]
    pub fn to_f32_array(&self) -> [f32; 3] {
        [self.0.x as f32, self.0.y as f32, self.0.z as f32]
    }

    /// Distance from the Earth's center in scene units
    #[inline]
    pub fn radius(&self) -> f64 {
        self.0.coords.norm()
    }
}
