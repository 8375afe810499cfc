//! Structural validation of incoming geometries.
//!
//! Every engine operation validates its inputs first; a malformed polygon is
//! rejected with a [`GeometryError`] instead of being silently repaired.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};
use landwatch_core::types::{GeoShape, Position};

use crate::types::GeometryError;

/// Parse GeoJSON geometry text (or a Feature wrapping one) and validate it.
///
/// Non-numeric coordinates are rejected here, by the deserializer.
pub fn parse(text: &str) -> Result<GeoShape, GeometryError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| GeometryError::Parse(e.to_string()))?;
    let geometry = match value.get("type").and_then(serde_json::Value::as_str) {
        Some("Feature") => value
            .get("geometry")
            .filter(|g| !g.is_null())
            .cloned()
            .ok_or_else(|| GeometryError::Parse("feature has no geometry".to_string()))?,
        _ => value,
    };
    let shape: GeoShape =
        serde_json::from_value(geometry).map_err(|e| GeometryError::Parse(e.to_string()))?;
    validate(&shape)?;
    Ok(shape)
}

pub fn validate(shape: &GeoShape) -> Result<(), GeometryError> {
    let polygons: Vec<&Vec<Vec<Position>>> = match shape {
        GeoShape::Polygon(rings) => vec![rings],
        GeoShape::MultiPolygon(polygons) => polygons.iter().collect(),
    };
    if polygons.is_empty() {
        return Err(GeometryError::Empty);
    }
    for (polygon, rings) in polygons.into_iter().enumerate() {
        if rings.is_empty() {
            return Err(GeometryError::Empty);
        }
        for (ring, coords) in rings.iter().enumerate() {
            validate_ring(polygon, ring, coords)?;
        }
    }
    Ok(())
}

fn validate_ring(polygon: usize, ring: usize, coords: &[Position]) -> Result<(), GeometryError> {
    if coords.len() < 4 {
        return Err(GeometryError::TooFewPoints {
            polygon,
            ring,
            points: coords.len(),
        });
    }
    for (vertex, &[lon, lat]) in coords.iter().enumerate() {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(GeometryError::NonFinite {
                polygon,
                ring,
                vertex,
            });
        }
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(GeometryError::OutOfRange {
                polygon,
                ring,
                vertex,
                lon,
                lat,
            });
        }
    }
    if coords.first() != coords.last() {
        return Err(GeometryError::UnclosedRing { polygon, ring });
    }
    check_simple(polygon, ring, coords)
}

/// Reject rings whose edges cross, touch away from their shared vertex, or
/// fold back onto each other (zero-area spikes).
fn check_simple(polygon: usize, ring: usize, coords: &[Position]) -> Result<(), GeometryError> {
    let mut points: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for &[x, y] in coords {
        let c = Coord { x, y };
        if points.last() != Some(&c) {
            points.push(c);
        }
    }
    // Closed ring with fewer than three distinct vertices.
    if points.len() < 4 {
        return Err(GeometryError::TooFewPoints {
            polygon,
            ring,
            points: points.len(),
        });
    }

    let segments: Vec<Line<f64>> = points.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let n = segments.len();
    let crossing = |at: Coord<f64>| GeometryError::SelfIntersection {
        polygon,
        ring,
        lon: at.x,
        lat: at.y,
    };

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(segments[i], segments[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { is_proper, .. }) if adjacent && !is_proper => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    return Err(crossing(intersection));
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    return Err(crossing(intersection.start));
                }
            }
        }
    }
    Ok(())
}
