//! Conversion between wire-level [`GeoShape`]s and `geo` multipolygons.
//!
//! Conversion is infallible; callers validate first.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use landwatch_core::types::{GeoShape, Position};

fn ring_to_line_string(ring: &[Position]) -> LineString<f64> {
    ring.iter()
        .map(|[x, y]| Coord { x: *x, y: *y })
        .collect::<Vec<_>>()
        .into()
}

fn rings_to_polygon(rings: &[Vec<Position>]) -> Polygon<f64> {
    let mut iter = rings.iter();
    let exterior = iter
        .next()
        .map(|r| ring_to_line_string(r))
        .unwrap_or_else(|| LineString::new(Vec::new()));
    let interiors = iter.map(|r| ring_to_line_string(r)).collect();
    Polygon::new(exterior, interiors)
}

fn line_string_positions(ring: &LineString<f64>) -> Vec<Position> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(line_string_positions)
        .collect()
}

pub fn to_multi_polygon(shape: &GeoShape) -> MultiPolygon<f64> {
    match shape {
        GeoShape::Polygon(rings) => MultiPolygon::new(vec![rings_to_polygon(rings)]),
        GeoShape::MultiPolygon(polygons) => {
            MultiPolygon::new(polygons.iter().map(|p| rings_to_polygon(p)).collect())
        }
    }
}

/// A single polygon comes back as `Polygon`, anything else as `MultiPolygon`.
pub fn to_shape(mp: &MultiPolygon<f64>) -> GeoShape {
    match mp.0.as_slice() {
        [single] => GeoShape::Polygon(polygon_rings(single)),
        many => GeoShape::MultiPolygon(many.iter().map(polygon_rings).collect()),
    }
}
