// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! earth-lite Core - Globe state for a 3D earth viewer
//!
//! This crate is what a GUI shell talks to. It imports shapefiles into a
//! [`Scene`] of meshes anchored on the WGS84 ellipsoid, publishes the scene
//! for the render loop, and keeps the interactive [`ViewState`].
//!
//! # Example
//!
//! ```ignore
//! use earth_lite_core::Globe;
//!
//! let globe = Globe::new();
//! globe.import("ne_110m_land.shp")?;
//!
//! // Render loop, possibly on another thread
//! let scene = globe.scene();
//! for mesh in scene.meshes() {
//!     let data = mesh.to_mesh_data();
//!     // upload data.positions / data.normals / data.outline_positions ...
//! }
//! ```

pub mod config;
pub mod globe;
pub mod view;

pub use config::{ConfigError, GlobeConfig};
pub use globe::Globe;
pub use view::ViewState;

// Re-export the types callers need alongside a Globe
pub use earth_lite_geometry::{
    CancellationToken, Mesh, MeshData, MeshOptions, Scene, SceneStats, SceneWarning,
    TessellationOptions,
};
pub use earth_lite_model::{
    project, CartesianPoint, DomainError, GeodeticPoint, ImportError, PolygonSource,
};
