//! Immutable per-parcel detection snapshots.
//!
//! A [`DetectionSnapshot`] can only be obtained through [`SnapshotBuilder`],
//! which rejects ill-formed metrics. Everything downstream (the classifier in
//! particular) may therefore assume a well-formed snapshot.

use serde::Serialize;

use crate::hash::{fingerprint, float_field};
use crate::types::{GeoShape, InferenceMetrics, LandUse};

/// Errors raised while assembling a snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("approved area must be positive and finite, got {0}")]
    ApprovedArea(f64),

    #[error("metric '{name}' is not finite: {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("metric '{name}' out of range [{min}, {max}]: {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// One immutable set of per-parcel metrics from a single evaluation run.
///
/// Serializable for the detection record, but deliberately not
/// deserializable: the only way in is [`SnapshotBuilder::build`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionSnapshot {
    parcel_id: String,
    approved_area: f64,
    land_use: LandUse,
    metrics: InferenceMetrics,
    has_encroachment: bool,
    encroachment_area: f64,
    encroachment_geometry: Option<GeoShape>,
    fingerprint: String,
}

impl DetectionSnapshot {
    pub fn builder(parcel_id: impl Into<String>, approved_area: f64, land_use: LandUse) -> SnapshotBuilder {
        SnapshotBuilder {
            parcel_id: parcel_id.into(),
            approved_area,
            land_use,
            metrics: InferenceMetrics::default(),
            has_encroachment: false,
            encroachment_area: 0.0,
            encroachment_geometry: None,
        }
    }

    pub fn parcel_id(&self) -> &str {
        &self.parcel_id
    }
    pub fn approved_area(&self) -> f64 {
        self.approved_area
    }
    pub fn land_use(&self) -> LandUse {
        self.land_use
    }
    pub fn metrics(&self) -> &InferenceMetrics {
        &self.metrics
    }
    pub fn built_up_area(&self) -> f64 {
        self.metrics.built_up_area
    }
    pub fn built_up_percentage(&self) -> f64 {
        self.metrics.built_up_percentage
    }
    pub fn heat_signature_area(&self) -> f64 {
        self.metrics.heat_signature_area
    }
    pub fn heat_percentage(&self) -> f64 {
        self.metrics.heat_percentage
    }
    pub fn change_score(&self) -> f64 {
        self.metrics.change_score
    }
    pub fn mean_ndvi(&self) -> f64 {
        self.metrics.mean_ndvi
    }
    pub fn mean_ndbi(&self) -> f64 {
        self.metrics.mean_ndbi
    }
    pub fn has_encroachment(&self) -> bool {
        self.has_encroachment
    }
    pub fn encroachment_area(&self) -> f64 {
        self.encroachment_area
    }
    pub fn encroachment_geometry(&self) -> Option<&GeoShape> {
        self.encroachment_geometry.as_ref()
    }

    /// Encroached area as a fraction of the approved area.
    pub fn encroachment_ratio(&self) -> f64 {
        self.encroachment_area / self.approved_area
    }

    /// Built-up area as a multiple of the approved area.
    pub fn construction_ratio(&self) -> f64 {
        self.metrics.built_up_area / self.approved_area
    }

    /// Deterministic content fingerprint (base62 xxhash64).
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Validating builder for [`DetectionSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    parcel_id: String,
    approved_area: f64,
    land_use: LandUse,
    metrics: InferenceMetrics,
    has_encroachment: bool,
    encroachment_area: f64,
    encroachment_geometry: Option<GeoShape>,
}

impl SnapshotBuilder {
    pub fn metrics(mut self, metrics: InferenceMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn built_up(mut self, area: f64, percentage: f64) -> Self {
        self.metrics.built_up_area = area;
        self.metrics.built_up_percentage = percentage;
        self
    }

    pub fn heat(mut self, area: f64, percentage: f64) -> Self {
        self.metrics.heat_signature_area = area;
        self.metrics.heat_percentage = percentage;
        self
    }

    pub fn change_score(mut self, score: f64) -> Self {
        self.metrics.change_score = score;
        self
    }

    pub fn indices(mut self, ndvi: f64, ndbi: f64) -> Self {
        self.metrics.mean_ndvi = ndvi;
        self.metrics.mean_ndbi = ndbi;
        self
    }

    pub fn encroachment(mut self, detected: bool, area: f64, geometry: Option<GeoShape>) -> Self {
        self.has_encroachment = detected;
        self.encroachment_area = area;
        self.encroachment_geometry = geometry;
        self
    }

    pub fn build(self) -> Result<DetectionSnapshot, SnapshotError> {
        if !self.approved_area.is_finite() || self.approved_area <= 0.0 {
            return Err(SnapshotError::ApprovedArea(self.approved_area));
        }
        let m = &self.metrics;
        for (name, value) in [
            ("built_up_area", m.built_up_area),
            ("built_up_percentage", m.built_up_percentage),
            ("heat_signature_area", m.heat_signature_area),
            ("heat_percentage", m.heat_percentage),
            ("change_score", m.change_score),
            ("mean_ndvi", m.mean_ndvi),
            ("mean_ndbi", m.mean_ndbi),
            ("encroachment_area", self.encroachment_area),
        ] {
            if !value.is_finite() {
                return Err(SnapshotError::NonFinite { name, value });
            }
        }
        check_range("change_score", m.change_score, 0.0, 1.0)?;
        check_range("encroachment_area", self.encroachment_area, 0.0, f64::MAX)?;
        check_range("built_up_area", m.built_up_area, 0.0, f64::MAX)?;
        check_range("heat_signature_area", m.heat_signature_area, 0.0, f64::MAX)?;
        check_range("built_up_percentage", m.built_up_percentage, 0.0, f64::MAX)?;
        check_range("heat_percentage", m.heat_percentage, 0.0, f64::MAX)?;

        let geometry_json = match &self.encroachment_geometry {
            Some(g) => serde_json::to_string(g).unwrap_or_default(),
            None => String::new(),
        };
        let floats: Vec<String> = [
            self.approved_area,
            m.built_up_area,
            m.built_up_percentage,
            m.heat_signature_area,
            m.heat_percentage,
            m.change_score,
            m.mean_ndvi,
            m.mean_ndbi,
            self.encroachment_area,
        ]
        .iter()
        .map(|v| float_field(*v))
        .collect();
        let flag = if self.has_encroachment { "1" } else { "0" };
        let fp = fingerprint(
            [self.parcel_id.as_str(), self.land_use.as_str(), flag]
                .into_iter()
                .chain(floats.iter().map(String::as_str))
                .chain(std::iter::once(geometry_json.as_str())),
        );

        Ok(DetectionSnapshot {
            parcel_id: self.parcel_id,
            approved_area: self.approved_area,
            land_use: self.land_use,
            metrics: self.metrics,
            has_encroachment: self.has_encroachment,
            encroachment_area: self.encroachment_area,
            encroachment_geometry: self.encroachment_geometry,
            fingerprint: fp,
        })
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), SnapshotError> {
    if value < min || value > max {
        return Err(SnapshotError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}
