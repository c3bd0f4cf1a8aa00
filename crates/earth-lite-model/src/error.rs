// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types shared by the import pipeline

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for import operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that can occur while importing a polygon source
///
/// `SourceNotFound`, `Format` and `Cancelled` abort the whole import. `Domain`
/// only rejects the record it was raised for.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Source path missing or unreadable
    #[error("Cannot read {}: {source}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source present but not a valid/supported shapefile
    #[error("Invalid shapefile {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    /// Record rejected because a coordinate lies outside the geodetic range
    #[error("Record {record} rejected: {source}")]
    Domain {
        record: usize,
        #[source]
        source: DomainError,
    },

    /// Import aborted through its cancellation token
    #[error("Import cancelled")]
    Cancelled,
}

impl ImportError {
    /// Create a source-not-found error
    pub fn source_not_found(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ImportError::SourceNotFound {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a format error
    pub fn format(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        ImportError::Format {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Create a domain error for a record
    pub fn domain(record: usize, source: DomainError) -> Self {
        ImportError::Domain { record, source }
    }

    /// Whether the import can continue past this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ImportError::Domain { .. })
    }
}

/// A geodetic coordinate outside the range the ellipsoid model accepts
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("coordinate out of range (lon {longitude}, lat {latitude}, alt {altitude})")]
pub struct DomainError {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

/// Why a polygon could not be filled
#[derive(Debug, Clone, PartialEq)]
pub enum DegenerateReason {
    /// Fewer than three usable points after cleanup
    TooFewPoints(usize),
    /// Exterior ring encloses no area
    ZeroArea,
    /// Two non-adjacent edges cross or overlap
    SelfIntersecting,
    /// The triangulator rejected the input
    Triangulation(String),
}

impl fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateReason::TooFewPoints(n) => write!(f, "only {} usable points", n),
            DegenerateReason::ZeroArea => write!(f, "zero area"),
            DegenerateReason::SelfIntersecting => write!(f, "self-intersecting ring"),
            DegenerateReason::Triangulation(msg) => write!(f, "triangulation failed: {}", msg),
        }
    }
}

/// A single polygon could not be tessellated; its fill is left empty
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Degenerate geometry: {reason}")]
pub struct DegenerateGeometryWarning {
    pub reason: DegenerateReason,
}

impl DegenerateGeometryWarning {
    /// Create a warning for the given reason
    pub fn new(reason: DegenerateReason) -> Self {
        Self { reason }
    }

    /// Create a too-few-points warning
    pub fn too_few_points(count: usize) -> Self {
        Self::new(DegenerateReason::TooFewPoints(count))
    }

    /// Create a triangulation failure warning
    pub fn triangulation(msg: impl Into<String>) -> Self {
        Self::new(DegenerateReason::Triangulation(msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_domain_is_recoverable() {
        let domain = ImportError::domain(
            3,
            DomainError {
                longitude: 200.0,
                latitude: 0.0,
                altitude: 0.0,
            },
        );
        assert!(domain.is_recoverable());
        assert!(!ImportError::Cancelled.is_recoverable());
        assert!(!ImportError::format("a.shp", "bad file code").is_recoverable());
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let err = ImportError::source_not_found(
            "/nonexistent.shp",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(err.to_string().contains("/nonexistent.shp"));

        let warning = DegenerateGeometryWarning::too_few_points(2);
        assert_eq!(warning.to_string(), "Degenerate geometry: only 2 usable points");
    }
}
