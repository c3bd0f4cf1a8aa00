// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-polygon display meshes
//!
//! A [`Mesh`] pairs the outline loops of a polygon, lifted slightly above the
//! surface, with the filled triangles from the [`Tessellator`].

use crate::tessellator::{TessellationOptions, Tessellator};
use crate::{Error, Result};
use earth_lite_model::{
    CartesianPoint, DegenerateGeometryWarning, Ellipsoid, Polygon, PolygonOrigin,
};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Display-ready geometry for one polygon
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    origin: PolygonOrigin,
    /// One closed loop per ring, exterior first
    outlines: Vec<Vec<CartesianPoint>>,
    /// Flat triangle list
    fill: Vec<CartesianPoint>,
}

impl Mesh {
    /// Polygon this mesh was built from
    pub fn origin(&self) -> PolygonOrigin {
        self.origin
    }

    /// Outline loops (the closing segment is implicit)
    pub fn outlines(&self) -> &[Vec<CartesianPoint>] {
        &self.outlines
    }

    /// Fill triangles, three points per triangle
    pub fn fill(&self) -> &[CartesianPoint] {
        &self.fill
    }

    pub fn has_fill(&self) -> bool {
        !self.fill.is_empty()
    }

    /// Check if mesh has neither outline nor fill
    pub fn is_empty(&self) -> bool {
        self.fill.is_empty() && self.outlines.iter().all(Vec::is_empty)
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.fill.len() / 3
    }

    /// Total number of outline vertices over all loops
    pub fn outline_vertex_count(&self) -> usize {
        self.outlines.iter().map(Vec::len).sum()
    }

    /// Summed area of the fill triangles in square scene units
    pub fn fill_area(&self) -> f64 {
        self.fill
            .chunks_exact(3)
            .map(|t| {
                let (a, b, c) = (t[0].to_vector(), t[1].to_vector(), t[2].to_vector());
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum()
    }

    /// Flattened single-precision buffers for a GPU backend
    pub fn to_mesh_data(&self) -> MeshData {
        let mut data = MeshData::with_capacity(self.fill.len(), self.outline_vertex_count());

        for t in self.fill.chunks_exact(3) {
            let (a, b, c) = (t[0].to_vector(), t[1].to_vector(), t[2].to_vector());
            let normal = (b - a)
                .cross(&(c - a))
                .try_normalize(0.0)
                .unwrap_or_else(|| a.normalize());
            let n = [normal.x as f32, normal.y as f32, normal.z as f32];

            for p in t {
                data.positions.extend_from_slice(&p.to_f32_array());
                data.normals.extend_from_slice(&n);
            }
        }

        for outline in &self.outlines {
            let start = data.outline_positions.len() / 3;
            for p in outline {
                data.outline_positions.extend_from_slice(&p.to_f32_array());
            }
            data.outline_loops.push(start..start + outline.len());
        }

        data
    }
}

/// GPU-ready mesh data
///
/// Contains flattened vertex data suitable for GPU rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Fill positions as flattened [x, y, z, x, y, z, ...], three vertices per triangle
    pub positions: Vec<f32>,
    /// Fill normals as flattened [nx, ny, nz, ...], one per fill vertex
    pub normals: Vec<f32>,
    /// Outline positions as flattened [x, y, z, ...]
    pub outline_positions: Vec<f32>,
    /// Vertex ranges of each closed outline loop in `outline_positions`
    pub outline_loops: Vec<Range<usize>>,
}

impl MeshData {
    /// Create mesh data with pre-allocated capacity
    pub fn with_capacity(fill_vertices: usize, outline_vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(fill_vertices * 3),
            normals: Vec::with_capacity(fill_vertices * 3),
            outline_positions: Vec::with_capacity(outline_vertices * 3),
            outline_loops: Vec::new(),
        }
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 9
    }

    /// Merge another mesh into this one
    pub fn merge(&mut self, other: &MeshData) {
        let offset = self.outline_positions.len() / 3;

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.outline_positions
            .extend_from_slice(&other.outline_positions);
        self.outline_loops.extend(
            other
                .outline_loops
                .iter()
                .map(|r| r.start + offset..r.end + offset),
        );
    }
}

/// Mesh building options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshOptions {
    /// Altitude of the outline loops in meters, above the fill at 0
    pub outline_altitude_m: f64,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            outline_altitude_m: 1.0,
        }
    }
}

impl MeshOptions {
    /// Set the outline altitude
    pub fn with_outline_altitude(mut self, meters: f64) -> Self {
        self.outline_altitude_m = meters;
        self
    }

    /// Check the outline sits strictly above the fill
    pub fn validate(&self) -> Result<()> {
        if !self.outline_altitude_m.is_finite() || self.outline_altitude_m <= 0.0 {
            return Err(Error::invalid_option(
                "outline_altitude_m",
                format!("{} must be a positive number of meters", self.outline_altitude_m),
            ));
        }
        Ok(())
    }
}

/// Builds one [`Mesh`] per polygon
#[derive(Clone, Debug, Default)]
pub struct MeshBuilder {
    ellipsoid: Ellipsoid,
    options: MeshOptions,
    tessellator: Tessellator,
}

impl MeshBuilder {
    /// Create a builder with default options on WGS84
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with explicit options
    pub fn with_options(mesh: MeshOptions, tessellation: TessellationOptions) -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            options: mesh,
            tessellator: Tessellator::new(tessellation),
        }
    }

    /// Use another reference ellipsoid for outlines and fill
    pub fn with_ellipsoid(mut self, ellipsoid: Ellipsoid) -> Self {
        self.ellipsoid = ellipsoid;
        self.tessellator = self.tessellator.with_ellipsoid(ellipsoid);
        self
    }

    pub fn options(&self) -> &MeshOptions {
        &self.options
    }

    /// Build a polygon's mesh; a degenerate fill is logged and left empty
    pub fn build(&self, polygon: &Polygon) -> Mesh {
        self.build_checked(polygon).0
    }

    /// Build a polygon's mesh and report why its fill is empty, if it is
    pub fn build_checked(&self, polygon: &Polygon) -> (Mesh, Option<DegenerateGeometryWarning>) {
        let outlines = polygon
            .rings()
            .map(|ring| {
                ring.points()
                    .iter()
                    .map(|p| self.ellipsoid.project_at(p, self.options.outline_altitude_m))
                    .collect()
            })
            .collect();

        let (fill, warning) = match self.tessellator.tessellate(polygon) {
            Ok(fill) => (fill, None),
            Err(warning) => {
                log::warn!("{}: {}", polygon.origin(), warning);
                (Vec::new(), Some(warning))
            }
        };

        let mesh = Mesh {
            origin: polygon.origin(),
            outlines,
            fill,
        };
        (mesh, warning)
    }
}
