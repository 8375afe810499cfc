//! Geodesic geometry for landwatch.
//!
//! Pure, stateless operations over parcel polygons in EPSG:4326:
//! - [`engine`]: the [`GeometryEngine`] facade (predicates, measures, encroachment)
//! - [`validate`]: GeoJSON parsing and structural validation
//! - [`measure`]: geodesic area and distance, local metric frames
//! - [`buffer`]: metric dilation and erosion
//! - [`ops`]: panic-safe boolean operations and parallel union
//! - [`convert`]: `GeoShape` ⇄ `geo::MultiPolygon`

pub mod buffer;
pub mod convert;
pub mod engine;
pub mod measure;
pub mod ops;
pub mod types;
pub mod validate;

pub use engine::GeometryEngine;
pub use types::{Encroachment, GeometryError};
