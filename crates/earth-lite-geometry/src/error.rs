// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry processing

use thiserror::Error;

/// Geometry processing result type
pub type Result<T> = std::result::Result<T, Error>;

/// Geometry processing errors
///
/// These stay inside the crate's building blocks. Polygons that cannot be
/// filled surface as [`DegenerateGeometryWarning`](earth_lite_model::DegenerateGeometryWarning)
/// instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Triangulation error
    #[error("Triangulation error: {0}")]
    Triangulation(String),

    /// Option value outside its valid range
    #[error("Invalid option {name}: {message}")]
    InvalidOption { name: &'static str, message: String },
}

impl Error {
    /// Create a triangulation error
    pub fn triangulation(msg: impl Into<String>) -> Self {
        Error::Triangulation(msg.into())
    }

    /// Create an invalid option error
    pub fn invalid_option(name: &'static str, msg: impl Into<String>) -> Self {
        Error::InvalidOption {
            name,
            message: msg.into(),
        }
    }
}
