// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene building
//!
//! A [`Scene`] holds the meshes of one import, in ingestion order, plus the
//! warnings raised while building them. Scenes are immutable once built; a new
//! import builds a new Scene.

use crate::mesh::{Mesh, MeshBuilder, MeshData};
use earth_lite_model::{
    DegenerateGeometryWarning, DomainError, ImportError, Polygon, PolygonOrigin,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Cooperative cancellation flag shared between an import and its caller
///
/// Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Problem recorded while building a scene that did not stop it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneWarning {
    /// Polygon kept its outline but has no fill
    #[error("{origin}: {warning}")]
    Degenerate {
        origin: PolygonOrigin,
        warning: DegenerateGeometryWarning,
    },

    /// Record skipped because of an out-of-range coordinate
    #[error("record {record}: {error}")]
    OutOfRange { record: usize, error: DomainError },
}

/// Scene statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub meshes: usize,
    pub filled_meshes: usize,
    pub triangles: usize,
    pub outline_vertices: usize,
    pub warnings: usize,
}

/// Meshes built from one import
#[derive(Clone, Debug, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
    warnings: Vec<SceneWarning>,
    source: Option<String>,
}

impl Scene {
    /// Scene with nothing in it
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tag the scene with a description of where it came from
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Meshes in ingestion order
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn warnings(&self) -> &[SceneWarning] {
        &self.warnings
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            meshes: self.meshes.len(),
            filled_meshes: self.meshes.iter().filter(|m| m.has_fill()).count(),
            triangles: self.meshes.iter().map(Mesh::triangle_count).sum(),
            outline_vertices: self.meshes.iter().map(Mesh::outline_vertex_count).sum(),
            warnings: self.warnings.len(),
        }
    }

    /// All meshes merged into one set of GPU buffers
    pub fn to_mesh_data(&self) -> MeshData {
        let mut data = MeshData::default();
        for mesh in &self.meshes {
            data.merge(&mesh.to_mesh_data());
        }
        data
    }

    fn push_polygon(&mut self, builder: &MeshBuilder, polygon: &Polygon) {
        let (mesh, warning) = builder.build_checked(polygon);
        if let Some(warning) = warning {
            self.warnings.push(SceneWarning::Degenerate {
                origin: polygon.origin(),
                warning,
            });
        }
        self.meshes.push(mesh);
    }
}

/// Build a scene from polygons with default options
pub fn build_scene(polygons: impl IntoIterator<Item = Polygon>) -> Scene {
    build_scene_with(&MeshBuilder::new(), polygons)
}

/// Build a scene from polygons, one mesh per polygon in order
///
/// Degenerate polygons keep their outline and are recorded as warnings.
pub fn build_scene_with(
    builder: &MeshBuilder,
    polygons: impl IntoIterator<Item = Polygon>,
) -> Scene {
    let mut scene = Scene::empty();
    for polygon in polygons {
        scene.push_polygon(builder, &polygon);
    }
    scene
}

/// Build a scene from a fallible polygon stream
///
/// Out-of-range records become [`SceneWarning::OutOfRange`] and building
/// continues. Any other error aborts and is returned. The token is checked
/// before every polygon.
///
/// # Returns
/// The complete scene, or the error that stopped it (`Cancelled` on
/// cancellation). No partial scene is ever returned.
pub fn try_build_scene(
    builder: &MeshBuilder,
    polygons: impl IntoIterator<Item = earth_lite_model::Result<Polygon>>,
    cancel: &CancellationToken,
) -> earth_lite_model::Result<Scene> {
    let mut scene = Scene::empty();

    for item in polygons {
        if cancel.is_cancelled() {
            log::info!("Scene build cancelled after {} meshes", scene.len());
            return Err(ImportError::Cancelled);
        }

        match item {
            Ok(polygon) => scene.push_polygon(builder, &polygon),
            Err(ImportError::Domain { record, source }) => {
                scene.warnings.push(SceneWarning::OutOfRange {
                    record,
                    error: source,
                });
            }
            Err(e) => return Err(e),
        }
    }

    // A cancel landing after the last polygon still wins
    if cancel.is_cancelled() {
        return Err(ImportError::Cancelled);
    }

    let stats = scene.stats();
    log::info!(
        "Built scene: {} meshes, {} triangles, {} warnings",
        stats.meshes,
        stats.triangles,
        stats.warnings
    );

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use earth_lite_model::{DegenerateReason, Ring};

    fn polygon(coords: &[(f64, f64)], record: usize) -> Polygon {
        Polygon::new(Ring::from_lon_lat(coords).unwrap(), vec![])
            .with_origin(PolygonOrigin { record, part: 0 })
    }

    fn square(x0: f64, record: usize) -> Polygon {
        polygon(
            &[(x0, 0.0), (x0, 1.0), (x0 + 1.0, 1.0), (x0 + 1.0, 0.0)],
            record,
        )
    }

    fn bowtie(record: usize) -> Polygon {
        polygon(&[(10.0, 0.0), (12.0, 2.0), (12.0, 0.0), (10.0, 2.0)], record)
    }

    #[test]
    fn test_degenerate_polygon_is_isolated() {
        let scene = build_scene(vec![square(0.0, 0), bowtie(1), square(20.0, 2)]);

        assert_eq!(scene.len(), 3);
        assert!(scene.meshes()[0].has_fill());
        assert!(!scene.meshes()[1].has_fill());
        assert!(!scene.meshes()[1].outlines().is_empty());
        assert!(scene.meshes()[2].has_fill());

        assert_eq!(scene.warnings().len(), 1);
        match &scene.warnings()[0] {
            SceneWarning::Degenerate { origin, warning } => {
                assert_eq!(origin.record, 1);
                assert_eq!(warning.reason, DegenerateReason::SelfIntersecting);
            }
            other => panic!("unexpected warning {:?}", other),
        }
    }

    #[test]
    fn test_meshes_keep_ingestion_order() {
        let scene = build_scene((0..5).map(|i| square(i as f64 * 3.0, i)));
        let records: Vec<usize> = scene.meshes().iter().map(|m| m.origin().record).collect();
        assert_eq!(records, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_domain_errors_become_warnings() {
        let bad = DomainError {
            longitude: 181.0,
            latitude: 0.0,
            altitude: 0.0,
        };
        let items = vec![
            Ok(square(0.0, 0)),
            Err(ImportError::domain(1, bad)),
            Ok(square(5.0, 2)),
        ];
        let scene =
            try_build_scene(&MeshBuilder::new(), items, &CancellationToken::new()).unwrap();

        assert_eq!(scene.len(), 2);
        assert_eq!(
            scene.warnings(),
            &[SceneWarning::OutOfRange {
                record: 1,
                error: bad
            }]
        );
    }

    #[test]
    fn test_format_error_aborts() {
        let items = vec![
            Ok(square(0.0, 0)),
            Err(ImportError::format("broken.shp", "truncated record")),
        ];
        let result = try_build_scene(&MeshBuilder::new(), items, &CancellationToken::new());
        assert!(matches!(result, Err(ImportError::Format { .. })));
    }

    #[test]
    fn test_cancellation_returns_no_scene() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let items = (0..10).map(move |i| {
            if i == 3 {
                trigger.cancel();
            }
            Ok(square(i as f64 * 2.0, i))
        });

        let result = try_build_scene(&MeshBuilder::new(), items, &token);
        assert!(matches!(result, Err(ImportError::Cancelled)));
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_stats() {
        let scene = build_scene(vec![square(0.0, 0), bowtie(1)]);
        let stats = scene.stats();
        assert_eq!(stats.meshes, 2);
        assert_eq!(stats.filled_meshes, 1);
        assert_eq!(stats.triangles, 2);
        assert_eq!(stats.outline_vertices, 8);
        assert_eq!(stats.warnings, 1);
        assert_eq!(scene.to_mesh_data().outline_loops.len(), 2);
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::empty();
        assert!(scene.is_empty());
        assert_eq!(scene.stats(), SceneStats::default());
        assert!(scene.source().is_none());
    }
}
