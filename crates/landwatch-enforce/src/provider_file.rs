use std::path::{Path, PathBuf};

use async_trait::async_trait;
use landwatch_core::types::{DateWindow, GeoShape, InferenceMetrics, Parcel};
use serde::Deserialize;

use crate::provider::{DetectedFootprint, GeometryProvider, InferenceProvider, ProviderError};

/// One `<parcel_id>.json` observation file.
///
/// ```json
/// {
///   "metrics": { "built_up_area": 9500.0, "built_up_percentage": 95.0, "change_score": 0.2 },
///   "detected": { "type": "Polygon", "coordinates": [[[81.6, 21.2], ...]] }
/// }
/// ```
///
/// `approved` is optional and falls back to the parcel's stored boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub metrics: InferenceMetrics,
    #[serde(default)]
    pub approved: Option<GeoShape>,
    #[serde(default)]
    pub detected: Option<GeoShape>,
}

/// Serves both provider interfaces from a directory of observation files.
#[derive(Debug, Clone)]
pub struct FileProvider {
    dir: PathBuf,
}

impl FileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, parcel_id: &str) -> Result<PathBuf, ProviderError> {
        let safe = !parcel_id.is_empty()
            && !parcel_id.contains(['/', '\\'])
            && parcel_id != "."
            && parcel_id != "..";
        if !safe {
            return Err(ProviderError::Malformed(format!(
                "parcel id {parcel_id:?} cannot name an observation file"
            )));
        }
        Ok(self.dir.join(format!("{parcel_id}.json")))
    }

    pub async fn observation(&self, parcel_id: &str) -> Result<Observation, ProviderError> {
        let path = self.path_for(parcel_id)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::NotFound(parcel_id.to_string()));
            }
            Err(e) => {
                return Err(ProviderError::Unavailable(format!("{}: {e}", path.display())));
            }
        };
        serde_json::from_str(&text)
            .map_err(|e| ProviderError::Malformed(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl InferenceProvider for FileProvider {
    async fn metrics(
        &self,
        parcel: &Parcel,
        _window: &DateWindow,
    ) -> Result<InferenceMetrics, ProviderError> {
        Ok(self.observation(&parcel.id).await?.metrics)
    }
}

#[async_trait]
impl GeometryProvider for FileProvider {
    async fn footprint(
        &self,
        parcel: &Parcel,
        _window: &DateWindow,
    ) -> Result<DetectedFootprint, ProviderError> {
        let observation = self.observation(&parcel.id).await?;
        Ok(DetectedFootprint {
            approved: observation
                .approved
                .unwrap_or_else(|| parcel.boundary.clone()),
            detected: observation.detected,
        })
    }
}
