use landwatch_core::types::GeoShape;
use serde::Serialize;

/// Errors raised by geometry validation and computation.
///
/// A `GeometryError` is fatal for the parcel whose geometry raised it and for
/// nothing else.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("failed to parse geometry: {0}")]
    Parse(String),

    #[error("geometry is empty")]
    Empty,

    #[error("polygon {polygon} ring {ring} has {points} points (need at least 4)")]
    TooFewPoints {
        polygon: usize,
        ring: usize,
        points: usize,
    },

    #[error("polygon {polygon} ring {ring} is not closed")]
    UnclosedRing { polygon: usize, ring: usize },

    #[error("polygon {polygon} ring {ring} vertex {vertex} is not a finite number")]
    NonFinite {
        polygon: usize,
        ring: usize,
        vertex: usize,
    },

    #[error("polygon {polygon} ring {ring} vertex {vertex} out of range: ({lon}, {lat})")]
    OutOfRange {
        polygon: usize,
        ring: usize,
        vertex: usize,
        lon: f64,
        lat: f64,
    },

    #[error("polygon {polygon} ring {ring} self-intersects near ({lon}, {lat})")]
    SelfIntersection {
        polygon: usize,
        ring: usize,
        lon: f64,
        lat: f64,
    },

    #[error("buffer distance must be finite, got {0}")]
    BufferDistance(f64),

    #[error("negative buffer of {0} m erases the geometry")]
    Collapsed(f64),

    #[error("{op} failed on degenerate input")]
    Degenerate { op: &'static str },
}

/// Result of comparing a detected activity footprint with an approved boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encroachment {
    pub detected: bool,
    /// Geodesic area outside the approved boundary, in square meters.
    pub area_m2: f64,
    /// The encroaching part of the footprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeoShape>,
}

impl Encroachment {
    /// The footprint lies entirely within the approved boundary.
    pub fn none() -> Self {
        Self {
            detected: false,
            area_m2: 0.0,
            geometry: None,
        }
    }
}
