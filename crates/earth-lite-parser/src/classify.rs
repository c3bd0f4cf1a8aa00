// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ring classification: split a record's parts into simple polygons
//!
//! Shapefiles store exteriors clockwise and holes counter-clockwise, with no
//! explicit grouping. This module recovers the grouping with `geo` winding and
//! containment predicates, working in the (lon, lat) plane.

use crate::decoder::RawPoint;
use earth_lite_model::{DomainError, GeodeticPoint, Polygon, PolygonOrigin, Ring};
use geo::algorithm::contains::Contains;
use geo::algorithm::winding_order::{Winding, WindingOrder};
use geo::{Coord, LineString};

/// One part of a record, validated and ready for grouping
struct Part {
    ring: Ring,
    planar: geo::Polygon<f64>,
    clockwise: bool,
}

impl Part {
    /// Whether any vertex lies strictly inside `outer`
    fn inside(&self, outer: &geo::Polygon<f64>) -> bool {
        self.planar
            .exterior()
            .coords()
            .any(|c| outer.contains(c))
    }
}

/// Group a record's parts into polygons
///
/// Rules:
/// - parts with fewer than 3 distinct points are dropped
/// - clockwise parts are exteriors, counter-clockwise parts are holes
/// - parts with no winding (zero area) are exteriors
/// - each hole joins the first exterior that contains it
/// - holes no exterior contains become exteriors themselves
/// - a record with no clockwise part treats every part as an exterior
///
/// Polygons come back ordered by the position of their exterior part, so the
/// record's ring order is preserved.
///
/// # Returns
/// The polygons, or the first out-of-range coordinate found in the record
pub fn classify_rings(record: usize, parts: &[Vec<RawPoint>]) -> Result<Vec<Polygon>, DomainError> {
    let mut valid = Vec::with_capacity(parts.len());

    for (i, raw) in parts.iter().enumerate() {
        let points = raw
            .iter()
            .map(|p| GeodeticPoint::new(p.x, p.y, p.z))
            .collect::<Result<Vec<_>, _>>()?;
        let ring = Ring::new(points);

        if !ring.is_renderable() {
            log::debug!(
                "Record {}: dropping part {} with fewer than 3 distinct points",
                record,
                i
            );
            continue;
        }

        let mut line: LineString<f64> = raw.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
        line.close();
        // Rings without a winding (zero area) count as exteriors
        let clockwise = line.winding_order() != Some(WindingOrder::CounterClockwise);
        valid.push((i, Part {
            ring,
            planar: geo::Polygon::new(line, vec![]),
            clockwise,
        }));
    }

    let any_clockwise = valid.iter().any(|(_, part): &(usize, Part)| part.clockwise);

    // (part position, exterior, holes)
    let mut groups: Vec<(usize, Part, Vec<Ring>)> = Vec::new();
    let mut holes: Vec<(usize, Part)> = Vec::new();

    for (i, part) in valid {
        if part.clockwise || !any_clockwise {
            groups.push((i, part, Vec::new()));
        } else {
            holes.push((i, part));
        }
    }

    for (i, hole) in holes {
        let owner = groups
            .iter()
            .position(|(_, ext, _)| hole.inside(&ext.planar));

        match owner {
            Some(g) => groups[g].2.push(hole.ring),
            None => {
                log::debug!(
                    "Record {}: hole part {} lies in no exterior, promoting to exterior",
                    record,
                    i
                );
                groups.push((i, hole, Vec::new()));
            }
        }
    }

    groups.sort_by_key(|(i, _, _)| *i);

    Ok(groups
        .into_iter()
        .enumerate()
        .map(|(part, (_, exterior, holes))| {
            Polygon::new(exterior.ring, holes).with_origin(PolygonOrigin { record, part })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[(f64, f64)]) -> Vec<RawPoint> {
        coords
            .iter()
            .map(|&(x, y)| RawPoint { x, y, z: 0.0 })
            .collect()
    }

    /// Clockwise square (exterior in shapefile terms)
    fn cw_square(x0: f64, y0: f64, size: f64) -> Vec<RawPoint> {
        ring(&[
            (x0, y0),
            (x0, y0 + size),
            (x0 + size, y0 + size),
            (x0 + size, y0),
            (x0, y0),
        ])
    }

    /// Counter-clockwise square (hole in shapefile terms)
    fn ccw_square(x0: f64, y0: f64, size: f64) -> Vec<RawPoint> {
        let mut r = cw_square(x0, y0, size);
        r.reverse();
        r
    }

    #[test]
    fn test_multipolygon_split() {
        let parts = vec![
            cw_square(0.0, 0.0, 1.0),
            cw_square(10.0, 0.0, 1.0),
            cw_square(20.0, 0.0, 1.0),
        ];
        let polygons = classify_rings(2, &parts).unwrap();

        assert_eq!(polygons.len(), 3);
        for (i, p) in polygons.iter().enumerate() {
            assert!(p.holes().is_empty());
            assert_eq!(p.origin(), PolygonOrigin { record: 2, part: i });
        }
        assert_eq!(polygons[1].exterior().points()[0].lon(), 10.0);
    }

    #[test]
    fn test_hole_assigned_to_containing_exterior() {
        let parts = vec![
            cw_square(0.0, 0.0, 10.0),
            cw_square(20.0, 0.0, 10.0),
            ccw_square(23.0, 3.0, 2.0),
        ];
        let polygons = classify_rings(0, &parts).unwrap();

        assert_eq!(polygons.len(), 2);
        assert!(polygons[0].holes().is_empty());
        assert_eq!(polygons[1].holes().len(), 1);
    }

    #[test]
    fn test_orphan_hole_promoted() {
        let parts = vec![
            cw_square(0.0, 0.0, 1.0),
            cw_square(5.0, 0.0, 1.0),
            ccw_square(50.0, 50.0, 1.0),
        ];
        let polygons = classify_rings(0, &parts).unwrap();
        assert_eq!(polygons.len(), 3);
        assert!(polygons.iter().all(|p| p.holes().is_empty()));
    }

    #[test]
    fn test_hole_outside_single_exterior_promoted() {
        let parts = vec![cw_square(0.0, 0.0, 1.0), ccw_square(40.0, 0.0, 1.0)];
        let polygons = classify_rings(0, &parts).unwrap();

        assert_eq!(polygons.len(), 2);
        assert!(polygons.iter().all(|p| p.holes().is_empty()));
        assert_eq!(polygons[1].exterior().points()[0].lon(), 40.0);
        assert_eq!(polygons[1].origin().part, 1);
    }

    #[test]
    fn test_hole_inside_single_exterior_attached() {
        let parts = vec![cw_square(0.0, 0.0, 10.0), ccw_square(3.0, 3.0, 2.0)];
        let polygons = classify_rings(0, &parts).unwrap();

        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].holes().len(), 1);
    }

    #[test]
    fn test_all_counter_clockwise_are_exteriors() {
        let parts = vec![ccw_square(0.0, 0.0, 1.0), ccw_square(3.0, 0.0, 1.0)];
        let polygons = classify_rings(0, &parts).unwrap();
        assert_eq!(polygons.len(), 2);
    }

    #[test]
    fn test_ring_order_preserved() {
        let parts = vec![cw_square(0.0, 0.0, 1.0), ring(&[(0.0, 0.0), (1.0, 1.0)])];
        let polygons = classify_rings(0, &parts).unwrap();
        assert_eq!(polygons.len(), 1);

        let first = &polygons[0].exterior().points()[..4];
        let lons: Vec<f64> = first.iter().map(|p| p.lon()).collect();
        let lats: Vec<f64> = first.iter().map(|p| p.lat()).collect();
        assert_eq!(lons, vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(lats, vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_rejects_record() {
        let parts = vec![cw_square(0.0, 0.0, 1.0), cw_square(500_000.0, 0.0, 1.0)];
        let err = classify_rings(7, &parts).unwrap_err();
        assert_eq!(err.longitude, 500_000.0);
    }
}
