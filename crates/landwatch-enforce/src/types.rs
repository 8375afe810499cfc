use landwatch_core::snapshot::DetectionSnapshot;
use landwatch_core::types::{DateWindow, GeoShape, ViolationVerdict};
use landwatch_geometry::{Encroachment, GeometryEngine, GeometryError};
use serde::Serialize;

/// One parcel evaluated outside of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelEvaluation {
    pub window: DateWindow,
    pub snapshot: DetectionSnapshot,
    pub verdict: ViolationVerdict,
}

/// Approved boundary against a detected footprint, without classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncroachmentCheck {
    pub parcel_id: String,
    pub approved_area_m2: f64,
    pub detected_area_m2: f64,
    /// Share of the detected footprint inside the approved boundary, 0–100.
    pub overlap_percentage: f64,
    pub encroachment: Encroachment,
}

impl EncroachmentCheck {
    pub fn measure(
        engine: &GeometryEngine,
        parcel_id: impl Into<String>,
        approved: &GeoShape,
        detected: &GeoShape,
    ) -> Result<Self, GeometryError> {
        Ok(Self {
            parcel_id: parcel_id.into(),
            approved_area_m2: engine.area(approved)?,
            detected_area_m2: engine.area(detected)?,
            overlap_percentage: engine.overlap_percentage(detected, approved)?,
            encroachment: engine.encroachment(approved, detected)?,
        })
    }

    /// Encroaching area as a fraction of the approved area.
    pub fn ratio(&self) -> f64 {
        if self.approved_area_m2 > 0.0 {
            self.encroachment.area_m2 / self.approved_area_m2
        } else {
            0.0
        }
    }
}
