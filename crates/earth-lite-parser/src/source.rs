// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shapefile polygon source
//!
//! Ties the scanner, decoder and ring classifier together into a lazy polygon
//! iterator and maps their failures onto [`ImportError`].

use crate::classify::classify_rings;
use crate::decoder::{decode_record, RawShape};
use crate::header::{FileHeader, ShapeType};
use crate::scanner::{RecordScanner, ScanError};
use earth_lite_model::{ImportError, Polygon, PolygonSource, PolygonStream, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// A `.shp` file on disk
///
/// Every call to [`PolygonSource::polygons`] reopens the file, so the same
/// source can be imported repeatedly.
#[derive(Clone, Debug)]
pub struct ShapefileSource {
    path: PathBuf,
}

impl ShapefileSource {
    /// Create a source for the given path (nothing is read yet)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the `.shp` file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file and read its header
    pub fn open(&self) -> Result<ShapefileReader<BufReader<File>>> {
        let file =
            File::open(&self.path).map_err(|e| ImportError::source_not_found(&self.path, e))?;
        ShapefileReader::new(BufReader::new(file), &self.path)
    }
}

impl PolygonSource for ShapefileSource {
    fn polygons(&self) -> Result<PolygonStream<'_>> {
        Ok(Box::new(self.open()?))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Lazy polygon iterator over an open shapefile stream
///
/// Yields `Err(ImportError::Domain)` for a record with out-of-range
/// coordinates and keeps going; any other error ends the iteration.
pub struct ShapefileReader<R> {
    scanner: RecordScanner<R>,
    path: PathBuf,
    shape_type: ShapeType,
    /// Polygons of the current record not yet handed out
    pending: VecDeque<Polygon>,
    finished: bool,
}

impl<R: Read> ShapefileReader<R> {
    /// Read the header and check the file holds polygons
    ///
    /// # Arguments
    /// * `reader` - Byte stream positioned at the start of the file
    /// * `path` - Path used in error messages
    pub fn new(reader: R, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let scanner = RecordScanner::new(reader).map_err(|e| match e {
            ScanError::Io(io) => ImportError::source_not_found(path, io),
            ScanError::Malformed(msg) => ImportError::format(path, msg),
        })?;

        let code = scanner.header().shape_type_code;
        let shape_type = match scanner.header().shape_type() {
            Some(t) if t.is_polygon() => t,
            Some(t) => {
                return Err(ImportError::format(
                    path,
                    format!("unsupported geometry type {:?}", t),
                ))
            }
            None => {
                return Err(ImportError::format(
                    path,
                    format!("unknown shape type code {}", code),
                ))
            }
        };

        log::debug!(
            "Opened {} ({:?}, {} bytes)",
            path.display(),
            shape_type,
            scanner.header().file_length
        );

        Ok(Self {
            scanner,
            path: path.to_path_buf(),
            shape_type,
            pending: VecDeque::new(),
            finished: false,
        })
    }

    /// Main file header
    pub fn header(&self) -> &FileHeader {
        self.scanner.header()
    }

    /// Polygon-family shape type declared by the file
    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    fn fail(&mut self, err: ImportError) -> Option<Result<Polygon>> {
        self.finished = true;
        self.pending.clear();
        Some(Err(err))
    }
}

impl<R: Read> Iterator for ShapefileReader<R> {
    type Item = Result<Polygon>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(polygon) = self.pending.pop_front() {
                return Some(Ok(polygon));
            }
            if self.finished {
                return None;
            }

            let record = match self.scanner.next_record() {
                Ok(Some(record)) => record,
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(ScanError::Io(e)) => {
                    let err = ImportError::source_not_found(&self.path, e);
                    return self.fail(err);
                }
                Err(ScanError::Malformed(msg)) => {
                    let err = ImportError::format(&self.path, msg);
                    return self.fail(err);
                }
            };

            let parts = match decode_record(&record.content, self.shape_type) {
                Ok(RawShape::Null) => continue,
                Ok(RawShape::Polygon { parts, .. }) => parts,
                Err(msg) => {
                    let err =
                        ImportError::format(&self.path, format!("record {}: {}", record.number, msg));
                    return self.fail(err);
                }
            };

            match classify_rings(record.index, &parts) {
                Ok(polygons) => {
                    if polygons.is_empty() {
                        log::debug!("Record {} has no renderable rings", record.index);
                    }
                    self.pending.extend(polygons);
                }
                Err(e) => {
                    log::warn!("Record {} rejected: {}", record.index, e);
                    return Some(Err(ImportError::domain(record.index, e)));
                }
            }
        }
    }
}
