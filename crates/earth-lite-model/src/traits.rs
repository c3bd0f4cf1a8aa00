// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for polygon input
//!
//! These traits decouple scene building from any particular file format.

use crate::{Polygon, Result};

/// Lazy stream of polygons produced by a [`PolygonSource`]
///
/// Items are fallible: recoverable errors (see
/// [`ImportError::is_recoverable`](crate::ImportError::is_recoverable)) reject a
/// single record, anything else ends the import.
pub type PolygonStream<'a> = Box<dyn Iterator<Item = Result<Polygon>> + 'a>;

/// Restartable source of polygons
///
/// Each call to [`polygons`](PolygonSource::polygons) starts a fresh pass over
/// the underlying data, so a source can be imported more than once.
///
/// # Example
///
/// ```ignore
/// use earth_lite_model::PolygonSource;
///
/// fn count(source: &dyn PolygonSource) -> earth_lite_model::Result<usize> {
///     let mut n = 0;
///     for polygon in source.polygons()? {
///         polygon?;
///         n += 1;
///     }
///     Ok(n)
/// }
/// ```
pub trait PolygonSource {
    /// Open the source and return a lazy polygon stream
    ///
    /// # Returns
    /// The stream, or a file-level error (missing source, bad header)
    fn polygons(&self) -> Result<PolygonStream<'_>>;

    /// Human-readable description used in logs (path, name, ...)
    fn describe(&self) -> String;
}

/// In-memory polygons, mostly useful for tests and programmatic scenes
impl PolygonSource for [Polygon] {
    fn polygons(&self) -> Result<PolygonStream<'_>> {
        Ok(Box::new(self.iter().cloned().map(Ok)))
    }

    fn describe(&self) -> String {
        format!("{} in-memory polygons", self.len())
    }
}

impl PolygonSource for Vec<Polygon> {
    fn polygons(&self) -> Result<PolygonStream<'_>> {
        self.as_slice().polygons()
    }

    fn describe(&self) -> String {
        self.as_slice().describe()
    }
}
