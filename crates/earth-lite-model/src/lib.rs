// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! earth-lite Model - Value types and shared abstractions for the globe pipeline
//!
//! This crate provides the vocabulary shared by the ingestion, geometry and
//! core crates. It has no I/O of its own.
//!
//! # Architecture
//!
//! - [`GeodeticPoint`], [`Ring`], [`Polygon`] - validated geodetic input geometry
//! - [`Ellipsoid`] / [`CartesianPoint`] - the WGS84 LLH → ECEF projection. A
//!   `CartesianPoint` can only be produced by the ellipsoid.
//! - [`PolygonSource`] - lazy, restartable source of polygons (implemented by
//!   `earth-lite-parser` for shapefiles)
//! - [`ImportError`], [`DomainError`], [`DegenerateGeometryWarning`] - the
//!   error taxonomy used across the workspace
//!
//! # Example
//!
//! ```
//! use earth_lite_model::{project, GeodeticPoint, Ellipsoid};
//!
//! let p = project(0.0, 0.0, 0.0).unwrap();
//! assert!((p.x() - 6.378137).abs() < 1e-9);
//!
//! let paris = GeodeticPoint::new(2.35, 48.85, 0.0).unwrap();
//! let q = Ellipsoid::WGS84.project(&paris);
//! assert!(q.z() > 0.0);
//! ```

pub mod ellipsoid;
pub mod error;
pub mod traits;
pub mod types;

// Re-export all public types
pub use ellipsoid::*;
pub use error::*;
pub use traits::*;
pub use types::*;
