use geo::{Intersects, MultiPolygon, Relate};
use landwatch_core::types::{GeoShape, Parcel};
use rayon::prelude::*;

use crate::convert::{to_multi_polygon, to_shape};
use crate::measure::{geodesic_area, geodesic_distance};
use crate::types::{Encroachment, GeometryError};
use crate::{buffer, ops, validate};

/// Default number of segments used to approximate a full circle in buffers.
pub const DEFAULT_ARC_SEGMENTS: usize = 32;

/// Stateless geodesic operations over parcel geometries.
///
/// Every operation validates its inputs and fails with a [`GeometryError`]
/// on malformed geometry. The engine holds no mutable state and is shared
/// between workers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct GeometryEngine {
    arc_segments: usize,
}

impl Default for GeometryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryEngine {
    pub fn new() -> Self {
        Self {
            arc_segments: DEFAULT_ARC_SEGMENTS,
        }
    }

    /// Use `segments` vertices per full circle when buffering.
    pub fn with_arc_segments(mut self, segments: usize) -> Self {
        self.arc_segments = segments.max(4);
        self
    }

    fn load(&self, shape: &GeoShape) -> Result<MultiPolygon<f64>, GeometryError> {
        validate::validate(shape)?;
        Ok(to_multi_polygon(shape))
    }

    /// Parse and validate GeoJSON geometry text.
    pub fn parse(&self, text: &str) -> Result<GeoShape, GeometryError> {
        validate::parse(text)
    }

    pub fn validate(&self, shape: &GeoShape) -> Result<(), GeometryError> {
        validate::validate(shape)
    }

    /// True iff `inner` lies entirely within `outer`. Sharing boundary
    /// segments still counts as contained.
    pub fn containment(&self, outer: &GeoShape, inner: &GeoShape) -> Result<bool, GeometryError> {
        let (outer, inner) = (self.load(outer)?, self.load(inner)?);
        Ok(outer.relate(&inner).is_contains())
    }

    pub fn intersects(&self, a: &GeoShape, b: &GeoShape) -> Result<bool, GeometryError> {
        let (a, b) = (self.load(a)?, self.load(b)?);
        Ok(a.intersects(&b))
    }

    /// The part of `a` outside `b`, or `None` when that part has no area.
    pub fn difference(&self, a: &GeoShape, b: &GeoShape) -> Result<Option<GeoShape>, GeometryError> {
        let (a, b) = (self.load(a)?, self.load(b)?);
        let diff = ops::difference(&a, &b)?;
        Ok(non_empty(&diff).map(to_shape))
    }

    /// Dissolve overlapping and adjacent shapes into one.
    pub fn union(&self, shapes: &[GeoShape]) -> Result<GeoShape, GeometryError> {
        if shapes.is_empty() {
            return Err(GeometryError::Empty);
        }
        let parts = shapes
            .par_iter()
            .map(|s| self.load(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(to_shape(&ops::union_all(parts)?))
    }

    /// Geodesic area in square meters.
    pub fn area(&self, shape: &GeoShape) -> Result<f64, GeometryError> {
        Ok(geodesic_area(&self.load(shape)?))
    }

    /// Geodesic distance in meters between nearest points; 0 if they intersect.
    pub fn distance(&self, a: &GeoShape, b: &GeoShape) -> Result<f64, GeometryError> {
        let (a, b) = (self.load(a)?, self.load(b)?);
        Ok(geodesic_distance(&a, &b))
    }

    /// Grow (positive) or shrink (negative) a shape by `meters`.
    pub fn buffer(&self, shape: &GeoShape, meters: f64) -> Result<GeoShape, GeometryError> {
        let mp = self.load(shape)?;
        if meters == 0.0 {
            return Ok(shape.clone());
        }
        Ok(to_shape(&buffer::buffer(&mp, meters, self.arc_segments)?))
    }

    /// Compare a detected activity footprint with the approved boundary.
    pub fn encroachment(
        &self,
        approved: &GeoShape,
        detected: &GeoShape,
    ) -> Result<Encroachment, GeometryError> {
        let (approved, detected) = (self.load(approved)?, self.load(detected)?);
        if approved.relate(&detected).is_contains() {
            return Ok(Encroachment::none());
        }
        let outside = ops::difference(&detected, &approved)?;
        let Some(outside) = non_empty(&outside) else {
            return Ok(Encroachment::none());
        };
        Ok(Encroachment {
            detected: true,
            area_m2: geodesic_area(outside),
            geometry: Some(to_shape(outside)),
        })
    }

    /// Area of `a ∩ b` as a percentage of the area of `a`, in [0, 100].
    pub fn overlap_percentage(&self, a: &GeoShape, b: &GeoShape) -> Result<f64, GeometryError> {
        let (a, b) = (self.load(a)?, self.load(b)?);
        let base = geodesic_area(&a);
        if base <= 0.0 {
            return Ok(0.0);
        }
        let shared = geodesic_area(&ops::intersection(&a, &b)?);
        Ok((shared / base * 100.0).clamp(0.0, 100.0))
    }

    pub fn within_distance(&self, a: &GeoShape, b: &GeoShape, meters: f64) -> Result<bool, GeometryError> {
        Ok(self.distance(a, b)? <= meters)
    }

    /// Parcels within `meters` of `reference`, nearest first.
    pub fn nearby<'a>(
        &self,
        reference: &GeoShape,
        candidates: &'a [Parcel],
        meters: f64,
    ) -> Result<Vec<(&'a Parcel, f64)>, GeometryError> {
        let reference = self.load(reference)?;
        let mut hits = candidates
            .par_iter()
            .map(|parcel| {
                let boundary = self.load(&parcel.boundary)?;
                Ok((parcel, geodesic_distance(&reference, &boundary)))
            })
            .filter(|hit| !matches!(hit, Ok((_, d)) if *d > meters))
            .collect::<Result<Vec<_>, GeometryError>>()?;
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.id.cmp(&b.0.id)));
        Ok(hits)
    }
}

fn non_empty(mp: &MultiPolygon<f64>) -> Option<&MultiPolygon<f64>> {
    (!mp.0.is_empty() && geodesic_area(mp) > ops::MIN_AREA_M2).then_some(mp)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
