// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape record decoder using nom combinators
//!
//! Decodes the content of a single polygon-family record into its raw part
//! rings. Ring classification happens later in [`crate::classify`].

use crate::header::ShapeType;
use nom::{
    multi::count,
    number::complete::{be_i32, le_f64, le_i32},
    IResult, Parser,
};

// ============================================================================
// Parsing Primitives
// ============================================================================

/// Big-endian i32 (file code, lengths, record numbers)
pub(crate) fn be_int(input: &[u8]) -> IResult<&[u8], i32> {
    be_i32(input)
}

/// Little-endian i32 (shape types, counts, part offsets)
pub(crate) fn le_int(input: &[u8]) -> IResult<&[u8], i32> {
    le_i32(input)
}

/// Little-endian f64 (coordinates, ranges)
pub(crate) fn le_double(input: &[u8]) -> IResult<&[u8], f64> {
    le_f64(input)
}

/// Interleaved (x, y) pair
fn xy(input: &[u8]) -> IResult<&[u8], (f64, f64)> {
    let (input, x) = le_double(input)?;
    let (input, y) = le_double(input)?;
    Ok((input, (x, y)))
}

/// Record header: (record number, content length in bytes)
pub fn parse_record_header(input: &[u8]) -> IResult<&[u8], (i32, usize)> {
    let (input, number) = be_int(input)?;
    let (input, length_words) = be_int(input)?;
    Ok((input, (number, length_words.max(0) as usize * 2)))
}

// ============================================================================
// Record Content
// ============================================================================

/// Raw vertex as stored in the file (x = longitude, y = latitude)
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RawPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Decoded shape record
#[derive(Clone, Debug, PartialEq)]
pub enum RawShape {
    /// Null shape (no geometry)
    Null,
    /// Polygon-family record: one point list per part, in file order
    Polygon {
        shape_type: ShapeType,
        parts: Vec<Vec<RawPoint>>,
    },
}

/// Fixed-size polygon prefix after the shape type
struct PolygonPrefix {
    num_parts: usize,
    num_points: usize,
}

fn polygon_prefix(input: &[u8]) -> IResult<&[u8], (i32, i32)> {
    // Record bounding box is recomputed downstream when needed
    let (input, _bbox) = count(le_double, 4).parse(input)?;
    let (input, num_parts) = le_int(input)?;
    let (input, num_points) = le_int(input)?;
    Ok((input, (num_parts, num_points)))
}

/// Decode one record's content
///
/// # Arguments
/// * `content` - Record content (without the 8-byte record header)
/// * `expected` - Shape type declared in the file header
///
/// # Returns
/// The decoded shape, or a message describing why the record is malformed
pub fn decode_record(content: &[u8], expected: ShapeType) -> Result<RawShape, String> {
    let (input, code) =
        le_int(content).map_err(|_| "record too short for shape type".to_string())?;

    let shape_type = ShapeType::from_code(code)
        .ok_or_else(|| format!("unknown shape type code {}", code))?;

    if shape_type == ShapeType::Null {
        return Ok(RawShape::Null);
    }

    if !shape_type.is_polygon() {
        return Err(format!("unsupported geometry type {:?}", shape_type));
    }

    if shape_type != expected {
        return Err(format!(
            "record shape type {:?} does not match file shape type {:?}",
            shape_type, expected
        ));
    }

    let (input, (num_parts, num_points)) =
        polygon_prefix(input).map_err(|_| "truncated polygon header".to_string())?;

    if num_parts < 0 || num_points < 0 {
        return Err(format!(
            "negative part/point count ({}, {})",
            num_parts, num_points
        ));
    }
    let prefix = PolygonPrefix {
        num_parts: num_parts as usize,
        num_points: num_points as usize,
    };

    // Reject impossible counts before allocating
    let needed = prefix.num_parts * 4 + prefix.num_points * 16;
    if needed > input.len() {
        return Err(format!(
            "{} parts / {} points do not fit in {} bytes",
            prefix.num_parts,
            prefix.num_points,
            input.len()
        ));
    }

    let (input, offsets) = count(le_int, prefix.num_parts)
        .parse(input)
        .map_err(|_| "truncated part table".to_string())?;
    let (input, coords) = count(xy, prefix.num_points)
        .parse(input)
        .map_err(|_| "truncated point array".to_string())?;

    let z_values = if shape_type.has_z() {
        let (_, (_range, z)) = (count(le_double, 2), count(le_double, prefix.num_points))
            .parse(input)
            .map_err(|_| "truncated Z array".to_string())?;
        Some(z)
    } else {
        None
    };

    let bounds = part_bounds(&offsets, prefix.num_points)?;
    let parts = bounds
        .into_iter()
        .map(|(start, end)| {
            (start..end)
                .map(|i| RawPoint {
                    x: coords[i].0,
                    y: coords[i].1,
                    z: z_values.as_ref().map_or(0.0, |z| z[i]),
                })
                .collect()
        })
        .collect();

    Ok(RawShape::Polygon { shape_type, parts })
}

/// Turn the part offset table into (start, end) index pairs
fn part_bounds(offsets: &[i32], num_points: usize) -> Result<Vec<(usize, usize)>, String> {
    let mut bounds = Vec::with_capacity(offsets.len());

    for (i, &offset) in offsets.iter().enumerate() {
        if offset < 0 || offset as usize > num_points {
            return Err(format!("part {} offset {} out of range", i, offset));
        }
        let start = offset as usize;
        let end = match offsets.get(i + 1) {
            Some(&next) if next >= offset => next as usize,
            Some(&next) => {
                return Err(format!("part offsets not increasing ({} then {})", offset, next))
            }
            None => num_points,
        };
        bounds.push((start, end.min(num_points)));
    }

    if let Some(&(first, _)) = bounds.first() {
        if first != 0 {
            return Err(format!("first part starts at {} instead of 0", first));
        }
    }

    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon_content(shape_type: i32, parts: &[Vec<(f64, f64)>], z: Option<f64>) -> Vec<u8> {
        let num_points: usize = parts.iter().map(Vec::len).sum();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&shape_type.to_le_bytes());
        for v in [0.0f64, 0.0, 1.0, 1.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend_from_slice(&(parts.len() as i32).to_le_bytes());
        bytes.extend_from_slice(&(num_points as i32).to_le_bytes());
        let mut offset = 0i32;
        for part in parts {
            bytes.extend_from_slice(&offset.to_le_bytes());
            offset += part.len() as i32;
        }
        for &(x, y) in parts.iter().flatten() {
            bytes.extend_from_slice(&x.to_le_bytes());
            bytes.extend_from_slice(&y.to_le_bytes());
        }
        if let Some(z) = z {
            for v in [z, z] {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            for _ in 0..num_points {
                bytes.extend_from_slice(&z.to_le_bytes());
            }
        }
        bytes
    }

    fn square() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]
    }

    #[test]
    fn test_decode_two_part_polygon() {
        let content = polygon_content(5, &[square(), square()], None);
        let shape = decode_record(&content, ShapeType::Polygon).unwrap();

        match shape {
            RawShape::Polygon { shape_type, parts } => {
                assert_eq!(shape_type, ShapeType::Polygon);
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[0].len(), 5);
                assert_eq!(parts[1][2], RawPoint { x: 1.0, y: 1.0, z: 0.0 });
            }
            RawShape::Null => panic!("expected polygon"),
        }
    }

    #[test]
    fn test_decode_polygon_z() {
        let content = polygon_content(15, &[square()], Some(120.0));
        let shape = decode_record(&content, ShapeType::PolygonZ).unwrap();

        let RawShape::Polygon { parts, .. } = shape else {
            panic!("expected polygon");
        };
        assert!(parts[0].iter().all(|p| p.z == 120.0));
    }

    #[test]
    fn test_decode_polygon_m_ignores_measures() {
        // Trailing block has the same layout as a Z block: range then one value per point
        let content = polygon_content(25, &[square()], Some(7.5));
        let shape = decode_record(&content, ShapeType::PolygonM).unwrap();

        let RawShape::Polygon { shape_type, parts } = shape else {
            panic!("expected polygon");
        };
        assert_eq!(shape_type, ShapeType::PolygonM);
        assert_eq!(parts[0].len(), 5);
        assert!(parts[0].iter().all(|p| p.z == 0.0));
        assert_eq!(parts[0][1], RawPoint { x: 0.0, y: 1.0, z: 0.0 });
    }

    #[test]
    fn test_decode_null_record() {
        let content = 0i32.to_le_bytes();
        assert_eq!(
            decode_record(&content, ShapeType::Polygon).unwrap(),
            RawShape::Null
        );
    }

    #[test]
    fn test_decode_rejects_polyline() {
        let content = polygon_content(3, &[square()], None);
        let err = decode_record(&content, ShapeType::Polygon).unwrap_err();
        assert!(err.contains("unsupported geometry type"));
    }

    #[test]
    fn test_decode_rejects_truncated_points() {
        let content = polygon_content(5, &[square()], None);
        let err = decode_record(&content[..content.len() - 8], ShapeType::Polygon).unwrap_err();
        assert!(err.contains("do not fit") || err.contains("truncated"));
    }

    #[test]
    fn test_part_bounds_validation() {
        assert_eq!(part_bounds(&[0, 3], 5).unwrap(), vec![(0, 3), (3, 5)]);
        assert!(part_bounds(&[1], 5).is_err());
        assert!(part_bounds(&[0, 4, 2], 5).is_err());
        assert!(part_bounds(&[0, 9], 5).is_err());
    }

    #[test]
    fn test_record_header() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7i32.to_be_bytes());
        bytes.extend_from_slice(&64i32.to_be_bytes());
        let (_, (number, len)) = parse_record_header(&bytes).unwrap();
        assert_eq!(number, 7);
        assert_eq!(len, 128);
    }
}
