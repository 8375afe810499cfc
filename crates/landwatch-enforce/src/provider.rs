//! Interfaces to the external sources a parcel evaluation consumes.
//!
//! Inference models and footprint extraction live outside this workspace;
//! the coordinator only ever sees them through these traits.

use async_trait::async_trait;
use landwatch_core::types::{DateWindow, GeoShape, InferenceMetrics, Parcel};
use serde::{Deserialize, Serialize};

/// Errors from an external provider. Parcel-level: a provider failure marks
/// one parcel failed and never aborts a batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("no observation for parcel {0}")]
    NotFound(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider call timed out after {0} ms")]
    Timeout(u64),
}

impl ProviderError {
    /// Transient failures are worth another attempt; the rest are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_) | ProviderError::Timeout(_))
    }
}

/// Approved boundary and observed activity footprint for one parcel, both
/// in EPSG:4326 lon/lat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFootprint {
    pub approved: GeoShape,
    /// `None` means no activity was observed.
    #[serde(default)]
    pub detected: Option<GeoShape>,
}

/// Scalar outputs of the built-up, change, and thermal models.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn metrics(
        &self,
        parcel: &Parcel,
        window: &DateWindow,
    ) -> Result<InferenceMetrics, ProviderError>;
}

/// Source of the latest detected activity footprint.
#[async_trait]
pub trait GeometryProvider: Send + Sync {
    async fn footprint(
        &self,
        parcel: &Parcel,
        window: &DateWindow,
    ) -> Result<DetectedFootprint, ProviderError>;
}
