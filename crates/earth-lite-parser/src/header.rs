// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Main file header and shape type codes

use crate::decoder::{be_int, le_double, le_int};
use nom::{IResult, Parser};

/// Size of the main file header in bytes
pub const HEADER_LEN: usize = 100;

/// Magic number at the start of every `.shp` file
pub const FILE_CODE: i32 = 9994;

/// Format version written by all known producers
pub const FILE_VERSION: i32 = 1000;

/// ESRI shape type codes
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShapeType {
    /// Decode a shape type code
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => ShapeType::Null,
            1 => ShapeType::Point,
            3 => ShapeType::PolyLine,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::PolyLineZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::PolyLineM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            31 => ShapeType::MultiPatch,
            _ => return None,
        })
    }

    /// Shape type code
    pub fn code(self) -> i32 {
        match self {
            ShapeType::Null => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PolygonZ => 15,
            ShapeType::MultiPointZ => 18,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
            ShapeType::PolygonM => 25,
            ShapeType::MultiPointM => 28,
            ShapeType::MultiPatch => 31,
        }
    }

    /// Whether records of this type carry polygon rings
    pub fn is_polygon(self) -> bool {
        matches!(
            self,
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM
        )
    }

    /// Whether records of this type carry a Z array
    pub fn has_z(self) -> bool {
        matches!(
            self,
            ShapeType::PointZ | ShapeType::PolyLineZ | ShapeType::PolygonZ | ShapeType::MultiPointZ
        )
    }
}

/// Parsed main file header
#[derive(Clone, Debug, PartialEq)]
pub struct FileHeader {
    /// File code (9994 for valid files)
    pub file_code: i32,
    /// Total file length in bytes, header included
    pub file_length: u64,
    /// Format version
    pub version: i32,
    /// Raw shape type code declared for the whole file
    pub shape_type_code: i32,
    /// Bounding box (xmin, ymin, xmax, ymax)
    pub bbox: [f64; 4],
}

impl FileHeader {
    /// Declared shape type, if the code is known
    pub fn shape_type(&self) -> Option<ShapeType> {
        ShapeType::from_code(self.shape_type_code)
    }
}

/// Parse the 100-byte main file header
pub fn parse_header(input: &[u8]) -> IResult<&[u8], FileHeader> {
    let (input, file_code) = be_int(input)?;
    let (input, _unused) = nom::multi::count(be_int, 5).parse(input)?;
    let (input, length_words) = be_int(input)?;
    let (input, version) = le_int(input)?;
    let (input, shape_type_code) = le_int(input)?;
    let (input, bbox) = nom::multi::count(le_double, 4).parse(input)?;
    // Z and M ranges are not needed
    let (input, _ranges) = nom::multi::count(le_double, 4).parse(input)?;

    Ok((
        input,
        FileHeader {
            file_code,
            file_length: u64::from(length_words.max(0) as u32) * 2,
            version,
            shape_type_code,
            bbox: [bbox[0], bbox[1], bbox[2], bbox[3]],
        },
    ))
}
