// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # earth-lite Geometry Processing
//!
//! Turns geodetic polygons into display meshes anchored on the WGS84
//! ellipsoid. Every vertex comes out of the ellipsoid projection in
//! `earth-lite-model`; nothing here fabricates Cartesian coordinates.
//!
//! ## Overview
//!
//! - **Triangulation**: planar helpers and the earcutr wrapper
//! - **Tessellation**: polygon fill with hole support, degenerate input
//!   reported as [`DegenerateGeometryWarning`](earth_lite_model::DegenerateGeometryWarning)
//! - **Mesh Building**: outline loops above the surface plus the fill
//! - **Scenes**: one mesh per polygon, warnings collected, cooperative
//!   cancellation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use earth_lite_geometry::build_scene;
//!
//! let scene = build_scene(polygons);
//! for mesh in scene.meshes() {
//!     println!("{}: {} triangles", mesh.origin(), mesh.triangle_count());
//! }
//! ```

pub mod error;
pub mod mesh;
pub mod scene;
pub mod tessellator;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

// Re-export main types
pub use error::{Error, Result};
pub use mesh::{Mesh, MeshBuilder, MeshData, MeshOptions};
pub use scene::{
    build_scene, build_scene_with, try_build_scene, CancellationToken, Scene, SceneStats,
    SceneWarning,
};
pub use tessellator::{tessellate, TessellationOptions, Tessellator};
pub use triangulation::{
    calculate_polygon_normal, project_to_2d, project_to_2d_with_basis, triangulate_polygon,
    triangulate_polygon_with_holes,
};
