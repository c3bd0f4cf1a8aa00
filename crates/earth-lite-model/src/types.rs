// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for geodetic input geometry
//!
//! Points are validated once at construction, so everything downstream of
//! ingestion can project without re-checking ranges.

use crate::DomainError;
use std::fmt;

/// Longitude range accepted by [`GeodeticPoint::new`], in degrees
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// Latitude range accepted by [`GeodeticPoint::new`], in degrees
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Geodetic coordinate (longitude °, latitude °, altitude m)
///
/// Always finite and within [`LONGITUDE_RANGE`] / [`LATITUDE_RANGE`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GeodeticPoint {
    lon: f64,
    lat: f64,
    alt: f64,
}

impl GeodeticPoint {
    /// Create a validated point
    ///
    /// Returns a [`DomainError`] for non-finite components or a longitude /
    /// latitude outside the geodetic range.
    pub fn new(lon: f64, lat: f64, alt: f64) -> Result<Self, DomainError> {
        let valid = lon.is_finite()
            && lat.is_finite()
            && alt.is_finite()
            && LONGITUDE_RANGE.contains(&lon)
            && LATITUDE_RANGE.contains(&lat);

        if !valid {
            return Err(DomainError {
                longitude: lon,
                latitude: lat,
                altitude: alt,
            });
        }

        Ok(Self { lon, lat, alt })
    }

    /// Create a point on the ellipsoid surface (altitude 0)
    pub fn surface(lon: f64, lat: f64) -> Result<Self, DomainError> {
        Self::new(lon, lat, 0.0)
    }

    /// Longitude in degrees
    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in degrees
    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Altitude in meters above the ellipsoid
    #[inline]
    pub fn alt(&self) -> f64 {
        self.alt
    }
}

impl fmt::Display for GeodeticPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.1}m)", self.lon, self.lat, self.alt)
    }
}

/// Closed ring of geodetic points
///
/// The closing point is implicit: an explicit duplicate of the first point at
/// the end is stripped on construction.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Ring {
    points: Vec<GeodeticPoint>,
}

impl Ring {
    /// Create a ring, stripping an explicit closing duplicate
    pub fn new(mut points: Vec<GeodeticPoint>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// Create a ring from (lon, lat) pairs at altitude 0
    pub fn from_lon_lat(coords: &[(f64, f64)]) -> Result<Self, DomainError> {
        let points = coords
            .iter()
            .map(|&(lon, lat)| GeodeticPoint::surface(lon, lat))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(points))
    }

    /// Ring vertices (without closing duplicate)
    pub fn points(&self) -> &[GeodeticPoint] {
        &self.points
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if ring has no vertices
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of distinct vertices
    pub fn distinct_len(&self) -> usize {
        let mut keys: Vec<(f64, f64, f64)> =
            self.points.iter().map(|p| (p.lon, p.lat, p.alt)).collect();
        keys.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then(a.1.total_cmp(&b.1))
                .then(a.2.total_cmp(&b.2))
        });
        keys.dedup();
        keys.len()
    }

    /// Whether the ring has enough distinct points to render
    pub fn is_renderable(&self) -> bool {
        let Some(first) = self.points.first() else {
            return false;
        };
        let Some(second) = self.points.iter().find(|p| *p != first) else {
            return false;
        };
        self.points.iter().any(|p| p != first && p != second)
    }
}

/// Where a polygon came from in its source
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct PolygonOrigin {
    /// Zero-based shape record index
    pub record: usize,
    /// Zero-based polygon index within a multipolygon record
    pub part: usize,
}

impl fmt::Display for PolygonOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {} part {}", self.record, self.part)
    }
}

/// Simple polygon: one exterior ring plus zero or more holes
#[derive(Clone, PartialEq, Debug)]
pub struct Polygon {
    exterior: Ring,
    holes: Vec<Ring>,
    origin: PolygonOrigin,
}

impl Polygon {
    /// Create a polygon
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self {
            exterior,
            holes,
            origin: PolygonOrigin::default(),
        }
    }

    /// Tag the polygon with its source location
    pub fn with_origin(mut self, origin: PolygonOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Exterior ring
    pub fn exterior(&self) -> &Ring {
        &self.exterior
    }

    /// Hole rings
    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Exterior followed by holes
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    /// Source location
    pub fn origin(&self) -> PolygonOrigin {
        self.origin
    }

    /// Total vertex count over all rings
    pub fn vertex_count(&self) -> usize {
        self.rings().map(Ring::len).sum()
    }
}
