//! Metric buffering of lon/lat polygons.
//!
//! The shape is projected into a local metric frame, dilated or eroded by
//! the Minkowski band around its boundary, and projected back. Arcs around
//! vertices are approximated by regular polygons with a fixed segment count.

use std::f64::consts::TAU;

use geo::{Coord, LineString, MultiPolygon, Polygon};

use crate::measure::LocalProjection;
use crate::ops;
use crate::types::GeometryError;

/// Grow (positive `meters`) or shrink (negative) a multipolygon.
pub fn buffer(
    mp: &MultiPolygon<f64>,
    meters: f64,
    segments: usize,
) -> Result<MultiPolygon<f64>, GeometryError> {
    if !meters.is_finite() {
        return Err(GeometryError::BufferDistance(meters));
    }
    if meters == 0.0 {
        return Ok(mp.clone());
    }
    let projection = LocalProjection::around(mp).ok_or(GeometryError::Empty)?;
    let planar = projection.project(mp);
    let band = boundary_band(&planar, meters.abs(), segments.max(4))?;

    let result = if meters > 0.0 {
        ops::union_pair(&planar, &band)?
    } else {
        ops::difference(&planar, &band)?
    };
    if result.0.is_empty() {
        return Err(GeometryError::Collapsed(meters));
    }
    Ok(projection.unproject(&result))
}

/// Union of a disc at every vertex and a rectangle along every edge.
fn boundary_band(
    planar: &MultiPolygon<f64>,
    radius: f64,
    segments: usize,
) -> Result<MultiPolygon<f64>, GeometryError> {
    let mut pieces = Vec::new();
    for polygon in &planar.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            for line in ring.lines() {
                if let Some(quad) = edge_quad(line.start, line.end, radius) {
                    pieces.push(MultiPolygon::new(vec![quad]));
                }
                pieces.push(MultiPolygon::new(vec![disc(line.start, radius, segments)]));
            }
        }
    }
    ops::union_all(pieces)
}

fn disc(center: Coord<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = (0..segments)
        .map(|i| {
            let theta = TAU * i as f64 / segments as f64;
            Coord {
                x: center.x + radius * theta.cos(),
                y: center.y + radius * theta.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), Vec::new())
}

fn edge_quad(a: Coord<f64>, b: Coord<f64>, radius: f64) -> Option<Polygon<f64>> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return None;
    }
    let n = Coord {
        x: -dy / len * radius,
        y: dx / len * radius,
    };
    Some(Polygon::new(
        LineString::from(vec![a + n, b + n, b - n, a - n]),
        Vec::new(),
    ))
}
