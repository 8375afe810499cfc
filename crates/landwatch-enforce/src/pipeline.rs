use std::sync::Arc;

use landwatch_core::config::Thresholds;
use landwatch_core::snapshot::{DetectionSnapshot, SnapshotError};
use landwatch_core::types::{DateWindow, Parcel, ViolationVerdict};
use landwatch_geometry::{Encroachment, GeometryEngine, GeometryError};

use crate::classifier::ViolationClassifier;
use crate::provider::{GeometryProvider, InferenceProvider, ProviderError};
use crate::retry::RetryPolicy;

/// Why a single parcel could not be evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("geometry task failed: {0}")]
    Worker(String),
}

impl EvaluationError {
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::Provider(ProviderError::Timeout(_)) => "timeout",
            EvaluationError::Provider(_) => "provider",
            EvaluationError::Geometry(_) => "geometry",
            EvaluationError::Snapshot(_) => "snapshot",
            EvaluationError::Worker(_) => "worker",
        }
    }
}

/// The single-parcel pipeline: fetch, measure, snapshot, classify.
///
/// Holds only shared, read-only collaborators, so one instance serves every
/// worker of a batch.
#[derive(Clone)]
pub struct Pipeline {
    pub(crate) geometry: Arc<GeometryEngine>,
    pub(crate) classifier: Arc<ViolationClassifier>,
    pub(crate) inference: Arc<dyn InferenceProvider>,
    pub(crate) footprints: Arc<dyn GeometryProvider>,
    pub(crate) retry: RetryPolicy,
    pub(crate) thresholds: Thresholds,
}

impl Pipeline {
    pub fn new(
        inference: Arc<dyn InferenceProvider>,
        footprints: Arc<dyn GeometryProvider>,
        thresholds: Thresholds,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            geometry: Arc::new(GeometryEngine::new()),
            classifier: Arc::new(ViolationClassifier::new(&thresholds)),
            inference,
            footprints,
            retry,
            thresholds,
        }
    }

    pub fn with_geometry(mut self, geometry: Arc<GeometryEngine>) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<ViolationClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn classifier(&self) -> &ViolationClassifier {
        &self.classifier
    }

    pub async fn evaluate(
        &self,
        parcel: &Parcel,
        window: &DateWindow,
    ) -> Result<(DetectionSnapshot, ViolationVerdict), EvaluationError> {
        let footprint = self
            .retry
            .run("footprint", || self.footprints.footprint(parcel, window))
            .await?;
        let metrics = self
            .retry
            .run("metrics", || self.inference.metrics(parcel, window))
            .await?;

        // CPU-bound overlay runs on the blocking pool.
        let geometry = Arc::clone(&self.geometry);
        let encroachment = tokio::task::spawn_blocking(move || match &footprint.detected {
            Some(detected) => geometry.encroachment(&footprint.approved, detected),
            None => geometry
                .validate(&footprint.approved)
                .map(|()| Encroachment::none()),
        })
        .await
        .map_err(|e| EvaluationError::Worker(e.to_string()))??;

        let snapshot = DetectionSnapshot::builder(&parcel.id, parcel.approved_area, parcel.land_use)
            .metrics(metrics)
            .encroachment(
                encroachment.detected,
                encroachment.area_m2,
                encroachment.geometry,
            )
            .build()?;

        if snapshot.has_encroachment() {
            let ratio = snapshot.encroachment_ratio();
            if ratio < self.thresholds.encroachment_threshold {
                tracing::info!(
                    parcel = %parcel.id,
                    area_m2 = snapshot.encroachment_area(),
                    ratio,
                    "encroachment within tolerance"
                );
            } else {
                tracing::warn!(
                    parcel = %parcel.id,
                    area_m2 = snapshot.encroachment_area(),
                    ratio,
                    "encroachment beyond tolerance"
                );
            }
        }

        let verdict = self.classifier.evaluate(&snapshot);
        tracing::debug!(parcel = %parcel.id, category = %verdict.category, "parcel evaluated");
        Ok((snapshot, verdict))
    }
}
