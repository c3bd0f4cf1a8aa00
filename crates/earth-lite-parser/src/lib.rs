// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! earth-lite Parser - Streaming ESRI shapefile reader
//!
//! This crate reads polygon shapefiles (`.shp`) and yields the
//! [`Polygon`](earth_lite_model::Polygon)s defined in `earth-lite-model`.
//! It implements [`PolygonSource`](earth_lite_model::PolygonSource) so scene
//! building does not depend on the file format.
//!
//! # Features
//!
//! - **Streaming** - records are read one at a time through a buffered reader
//! - **nom decoding** - binary headers and records parsed with combinators
//! - **Ring classification** - multipolygon records split into simple polygons
//!   with `geo` winding and containment tests
//! - **Per-record rejection** - out-of-range coordinates reject one record, not
//!   the whole file
//!
//! Supported shape types are Polygon, PolygonZ and PolygonM. Companion
//! `.dbf`/`.shx` files are not read.
//!
//! # Example
//!
//! ```ignore
//! use earth_lite_parser::load;
//!
//! for polygon in load("countries.shp")? {
//!     let polygon = polygon?;
//!     println!("{}: {} vertices", polygon.origin(), polygon.vertex_count());
//! }
//! ```

mod classify;
mod decoder;
mod header;
mod scanner;
mod source;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use classify::classify_rings;
pub use decoder::{decode_record, RawPoint, RawShape};
pub use header::{FileHeader, ShapeType};
pub use scanner::{RawRecord, RecordScanner, ScanError};
pub use source::{ShapefileReader, ShapefileSource};

use earth_lite_model::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Open a shapefile and return its lazy polygon stream
///
/// The file is opened and its header validated immediately; records are read
/// as the iterator advances. Call again to restart from the beginning.
pub fn load(path: impl AsRef<Path>) -> Result<ShapefileReader<BufReader<File>>> {
    ShapefileSource::new(path).open()
}
