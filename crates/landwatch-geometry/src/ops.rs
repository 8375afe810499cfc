//! Boolean operations over `geo` multipolygons.
//!
//! The sweep-line implementation behind `BooleanOps` can panic on
//! near-degenerate input. Every call goes through [`guarded`] so a bad
//! polygon surfaces as a [`GeometryError`] for one parcel instead of taking
//! down a worker.

use std::panic::{self, AssertUnwindSafe};

use geo::{BooleanOps, MultiPolygon};
use rayon::prelude::*;

use crate::types::GeometryError;

/// Results whose geodesic area falls under this (m²) are treated as empty.
pub const MIN_AREA_M2: f64 = 1e-3;

/// Below this many inputs a sequential fold beats a parallel reduction.
const PARALLEL_UNION_MIN: usize = 8;

pub fn guarded<F>(op: &'static str, f: F) -> Result<MultiPolygon<f64>, GeometryError>
where
    F: FnOnce() -> MultiPolygon<f64>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|_| {
        tracing::warn!(op, "boolean operation failed on degenerate input");
        GeometryError::Degenerate { op }
    })
}

pub fn union_pair(
    a: &MultiPolygon<f64>,
    b: &MultiPolygon<f64>,
) -> Result<MultiPolygon<f64>, GeometryError> {
    guarded("union", || a.union(b))
}

pub fn difference(
    a: &MultiPolygon<f64>,
    b: &MultiPolygon<f64>,
) -> Result<MultiPolygon<f64>, GeometryError> {
    guarded("difference", || a.difference(b))
}

pub fn intersection(
    a: &MultiPolygon<f64>,
    b: &MultiPolygon<f64>,
) -> Result<MultiPolygon<f64>, GeometryError> {
    guarded("intersection", || a.intersection(b))
}

/// Dissolve all parts into one multipolygon. Large inputs are reduced as a
/// parallel tree.
pub fn union_all(parts: Vec<MultiPolygon<f64>>) -> Result<MultiPolygon<f64>, GeometryError> {
    if parts.len() < PARALLEL_UNION_MIN {
        let mut iter = parts.into_iter();
        let Some(first) = iter.next() else {
            return Ok(MultiPolygon::new(Vec::new()));
        };
        return iter.try_fold(first, |acc, next| union_pair(&acc, &next));
    }
    parts
        .into_par_iter()
        .map(Ok)
        .try_reduce_with(|a, b| union_pair(&a, &b))
        .unwrap_or_else(|| Ok(MultiPolygon::new(Vec::new())))
}
