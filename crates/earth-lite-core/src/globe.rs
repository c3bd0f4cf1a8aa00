// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Globe: import entry point and the published scene

use crate::config::{ConfigError, GlobeConfig};
use earth_lite_geometry::{try_build_scene, CancellationToken, MeshBuilder, Scene};
use earth_lite_model::{PolygonSource, Result};
use earth_lite_parser::ShapefileSource;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// The globe's current scene and the settings imports run with
///
/// Imports build a complete new [`Scene`] and publish it in one step. Readers
/// holding an `Arc<Scene>` keep their snapshot; a failed or cancelled import
/// leaves the published scene untouched.
pub struct Globe {
    config: GlobeConfig,
    builder: MeshBuilder,
    scene: RwLock<Arc<Scene>>,
}

impl Default for Globe {
    fn default() -> Self {
        Self::new()
    }
}

impl Globe {
    /// Create a globe with default settings and an empty scene
    pub fn new() -> Self {
        let config = GlobeConfig::default();
        Self {
            builder: config.mesh_builder(),
            config,
            scene: RwLock::new(Arc::new(Scene::empty())),
        }
    }

    /// Create a globe with validated settings
    pub fn with_config(config: GlobeConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            builder: config.mesh_builder(),
            config,
            scene: RwLock::new(Arc::new(Scene::empty())),
        })
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    /// Currently published scene
    pub fn scene(&self) -> Arc<Scene> {
        self.scene.read().clone()
    }

    /// Import a shapefile and publish its scene
    pub fn import(&self, path: impl AsRef<Path>) -> Result<Arc<Scene>> {
        self.import_with_cancel(path, &CancellationToken::new())
    }

    /// Import a shapefile, giving up when `cancel` is triggered
    pub fn import_with_cancel(
        &self,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<Arc<Scene>> {
        self.import_from(&ShapefileSource::new(path), cancel)
    }

    /// Import from any polygon source and publish the result
    ///
    /// # Returns
    /// The newly published scene, or the error that stopped the import
    pub fn import_from(
        &self,
        source: &dyn PolygonSource,
        cancel: &CancellationToken,
    ) -> Result<Arc<Scene>> {
        let start = Instant::now();
        let description = source.describe();
        log::info!("Importing {}", description);

        let built = source
            .polygons()
            .and_then(|polygons| try_build_scene(&self.builder, polygons, cancel));

        let scene = match built {
            Ok(scene) => Arc::new(scene.with_source(description)),
            Err(e) => {
                log::warn!("Import of {} failed: {}", description, e);
                return Err(e);
            }
        };

        *self.scene.write() = Arc::clone(&scene);

        log::info!(
            "Published {} meshes from {} in {} ms",
            scene.len(),
            scene.source().unwrap_or_default(),
            start.elapsed().as_millis()
        );
        Ok(scene)
    }

    /// Publish an empty scene
    pub fn clear(&self) {
        *self.scene.write() = Arc::new(Scene::empty());
    }
}
