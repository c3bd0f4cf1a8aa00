// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory shapefile encoder for tests
//!
//! Rings are given as (longitude, latitude) pairs without the closing point;
//! the encoder closes them the way real producers do.

use crate::header::{ShapeType, FILE_CODE, FILE_VERSION, HEADER_LEN};
use std::io;
use std::path::Path;

/// Clockwise unit square at the origin (an exterior ring)
pub const SQUARE: &[(f64, f64)] = &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];

enum Record {
    Null,
    Rings(Vec<Vec<(f64, f64)>>),
}

/// Builder for `.shp` byte images
pub struct ShapefileBuilder {
    shape_type: ShapeType,
    /// Constant altitude written to the Z array of PolygonZ files
    z: f64,
    records: Vec<Record>,
}

impl ShapefileBuilder {
    /// Polygon (type 5) file
    pub fn polygon() -> Self {
        Self {
            shape_type: ShapeType::Polygon,
            z: 0.0,
            records: Vec::new(),
        }
    }

    /// PolygonZ (type 15) file with every vertex at altitude `z`
    pub fn polygon_z(z: f64) -> Self {
        Self {
            shape_type: ShapeType::PolygonZ,
            z,
            records: Vec::new(),
        }
    }

    /// PolygonM (type 25) file; each vertex's measure is its index in the record
    pub fn polygon_m() -> Self {
        Self {
            shape_type: ShapeType::PolygonM,
            z: 0.0,
            records: Vec::new(),
        }
    }

    /// Append a polygon record with the given rings
    pub fn record(mut self, rings: &[&[(f64, f64)]]) -> Self {
        self.records
            .push(Record::Rings(rings.iter().map(|r| r.to_vec()).collect()));
        self
    }

    /// Append a null shape record
    pub fn null_record(mut self) -> Self {
        self.records.push(Record::Null);
        self
    }

    /// Encode the file
    pub fn build(&self) -> Vec<u8> {
        let contents: Vec<Vec<u8>> = self
            .records
            .iter()
            .map(|r| match r {
                Record::Null => 0i32.to_le_bytes().to_vec(),
                Record::Rings(rings) => self.encode_polygon(rings),
            })
            .collect();

        let body: usize = contents.iter().map(|c| c.len() + 8).sum();
        let bbox = bounds(self.records.iter().flat_map(|r| match r {
            Record::Null => Vec::new(),
            Record::Rings(rings) => rings.iter().flatten().copied().collect(),
        }));

        let mut out = Vec::with_capacity(HEADER_LEN + body);
        out.extend_from_slice(&FILE_CODE.to_be_bytes());
        out.extend_from_slice(&[0u8; 20]);
        out.extend_from_slice(&(((HEADER_LEN + body) / 2) as i32).to_be_bytes());
        out.extend_from_slice(&FILE_VERSION.to_le_bytes());
        out.extend_from_slice(&self.shape_type.code().to_le_bytes());
        put_f64s(&mut out, &bbox);
        put_f64s(&mut out, &[self.z, self.z, 0.0, 0.0]);

        for (i, content) in contents.iter().enumerate() {
            out.extend_from_slice(&(i as i32 + 1).to_be_bytes());
            out.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
            out.extend_from_slice(content);
        }
        out
    }

    /// Encode the file and write it to `path`
    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path, self.build())
    }

    fn encode_polygon(&self, rings: &[Vec<(f64, f64)>]) -> Vec<u8> {
        let closed: Vec<Vec<(f64, f64)>> = rings
            .iter()
            .map(|r| {
                let mut r = r.clone();
                if let Some(&first) = r.first() {
                    r.push(first);
                }
                r
            })
            .collect();
        let num_points: usize = closed.iter().map(Vec::len).sum();

        let mut out = Vec::new();
        out.extend_from_slice(&self.shape_type.code().to_le_bytes());
        put_f64s(&mut out, &bounds(closed.iter().flatten().copied()));
        out.extend_from_slice(&(closed.len() as i32).to_le_bytes());
        out.extend_from_slice(&(num_points as i32).to_le_bytes());

        let mut offset = 0i32;
        for ring in &closed {
            out.extend_from_slice(&offset.to_le_bytes());
            offset += ring.len() as i32;
        }
        for &(x, y) in closed.iter().flatten() {
            put_f64s(&mut out, &[x, y]);
        }

        if self.shape_type.has_z() {
            put_f64s(&mut out, &[self.z, self.z]);
            for _ in 0..num_points {
                put_f64s(&mut out, &[self.z]);
            }
        }
        if self.shape_type == ShapeType::PolygonM {
            put_f64s(&mut out, &[0.0, num_points.saturating_sub(1) as f64]);
            for m in 0..num_points {
                put_f64s(&mut out, &[m as f64]);
            }
        }
        out
    }
}

fn bounds(points: impl IntoIterator<Item = (f64, f64)>) -> [f64; 4] {
    points.into_iter().fold(
        [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
        |[x0, y0, x1, y1], (x, y)| [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
    )
}

fn put_f64s(out: &mut Vec<u8>, values: &[f64]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}
