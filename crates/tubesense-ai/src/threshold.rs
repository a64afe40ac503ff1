//! Neutral threshold resolution.
//!
//! Priority: explicit setting, then `t_neu` in the model directory's
//! `inference_config.json`, then [`DEFAULT_NEUTRAL_THRESHOLD`].

use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::error::ModelLoadError;

pub const DEFAULT_NEUTRAL_THRESHOLD: f32 = 0.5;
pub const INFERENCE_CONFIG_FILE: &str = "inference_config.json";

/// A neutral-class probability cutoff within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct NeutralThreshold(f32);

impl Default for NeutralThreshold {
    fn default() -> Self {
        Self(DEFAULT_NEUTRAL_THRESHOLD)
    }
}

impl TryFrom<f32> for NeutralThreshold {
    type Error = ModelLoadError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ModelLoadError::InvalidThreshold(value))
        }
    }
}

#[derive(Deserialize)]
struct InferenceConfig {
    #[serde(default, deserialize_with = "number_or_string")]
    t_neu: Option<f32>,
}

/// Some exporters write the threshold as a string.
fn number_or_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f32),
        Text(String),
    }
    match Option::<Raw>::deserialize(de)? {
        None => Ok(None),
        Some(Raw::Num(v)) => Ok(Some(v)),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl NeutralThreshold {
    pub fn value(self) -> f32 {
        self.0
    }

    /// Resolve the threshold for a model directory.
    ///
    /// An explicit value outside [0, 1] is an error. A missing, unreadable, or
    /// out-of-range file value falls back to the default with a warning.
    pub fn resolve(explicit: Option<f32>, model_dir: &Path) -> Result<Self, ModelLoadError> {
        if let Some(value) = explicit {
            let threshold = Self::try_from(value)?;
            info!(t_neu = value, source = "explicit", "neutral threshold");
            return Ok(threshold);
        }

        match Self::from_file(model_dir) {
            Some(threshold) => {
                info!(t_neu = threshold.0, source = INFERENCE_CONFIG_FILE, "neutral threshold");
                Ok(threshold)
            }
            None => {
                info!(t_neu = DEFAULT_NEUTRAL_THRESHOLD, source = "default", "neutral threshold");
                Ok(Self::default())
            }
        }
    }

    fn from_file(model_dir: &Path) -> Option<Self> {
        let path = model_dir.join(INFERENCE_CONFIG_FILE);
        if !path.exists() {
            return None;
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                serde_json::from_str::<InferenceConfig>(&text).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(InferenceConfig { t_neu: Some(value) }) => match Self::try_from(value) {
                Ok(threshold) => Some(threshold),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring t_neu");
                    None
                }
            },
            Ok(InferenceConfig { t_neu: None }) => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read inference config");
                None
            }
        }
    }
}
