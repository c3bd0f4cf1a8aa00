// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Globe configuration
//!
//! Loaded from TOML; every section and field is optional.
//!
//! ```toml
//! [mesh]
//! outline_altitude_m = 1.0
//!
//! [tessellation]
//! collinear_tolerance = 1e-9
//! area_tolerance = 1e-12
//! reject_self_intersections = true
//! ```

use earth_lite_geometry::{MeshBuilder, MeshOptions, TessellationOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error(transparent)]
    Invalid(#[from] earth_lite_geometry::Error),
}

/// Everything tunable about an import
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub mesh: MeshOptions,
    pub tessellation: TessellationOptions,
}

impl GlobeConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GlobeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every value is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mesh.validate()?;
        self.tessellation.validate()?;
        Ok(())
    }

    /// Set the outline altitude in meters
    pub fn with_outline_altitude(mut self, meters: f64) -> Self {
        self.mesh.outline_altitude_m = meters;
        self
    }

    /// Replace the tessellation options
    pub fn with_tessellation(mut self, options: TessellationOptions) -> Self {
        self.tessellation = options;
        self
    }

    /// Mesh builder configured from this config
    pub fn mesh_builder(&self) -> MeshBuilder {
        MeshBuilder::with_options(self.mesh.clone(), self.tessellation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GlobeConfig::default();
        assert_eq!(config.mesh.outline_altitude_m, 1.0);
        assert_eq!(config.tessellation.collinear_tolerance, 1e-9);
        assert_eq!(config.tessellation.area_tolerance, 1e-12);
        assert!(config.tessellation.reject_self_intersections);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GlobeConfig::from_toml_str(
            r#"
            [mesh]
            outline_altitude_m = 250.0
            "#,
        )
        .unwrap();
        assert_eq!(config.mesh.outline_altitude_m, 250.0);
        assert_eq!(config.tessellation, TessellationOptions::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(GlobeConfig::from_toml_str("").unwrap(), GlobeConfig::default());
    }

    #[test]
    fn test_non_positive_outline_altitude_rejected() {
        let err = GlobeConfig::from_toml_str("[mesh]\noutline_altitude_m = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = GlobeConfig::from_toml_str("[tessellation]\narea_tolerance = \"big\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GlobeConfig::load(dir.path().join("globe.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
