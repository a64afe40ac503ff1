//! Mapping from model output index to sentiment label.
//!
//! Read from the model's `config.json` (`id2label`) when it names the three
//! classes; otherwise the conventional `[negative, neutral, positive]` order.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};
use tubesense_core::{SentimentLabel, SentimentScores};

use crate::error::ModelLoadError;

pub const MODEL_CONFIG_FILE: &str = "config.json";

/// Which label each of the model's three logits belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelLayout {
    order: [SentimentLabel; 3],
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            order: SentimentLabel::ALL,
        }
    }
}

#[derive(Deserialize)]
struct ModelConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

impl LabelLayout {
    /// Build a layout from an explicit order. Each label must appear once.
    pub fn new(order: [SentimentLabel; 3]) -> Result<Self, ModelLoadError> {
        for label in SentimentLabel::ALL {
            if !order.contains(&label) {
                return Err(ModelLoadError::Labels(format!("{label} missing from {order:?}")));
            }
        }
        Ok(Self { order })
    }

    pub fn order(&self) -> [SentimentLabel; 3] {
        self.order
    }

    /// Read `id2label` from `config.json` in the model directory.
    ///
    /// A missing file or unrecognised label names fall back to the default
    /// order. A label count other than three is an error.
    pub fn from_model_dir(model_dir: &Path) -> Result<Self, ModelLoadError> {
        let path = model_dir.join(MODEL_CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| ModelLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let config: ModelConfig =
            serde_json::from_str(&text).map_err(|source| ModelLoadError::Config {
                path: path.clone(),
                source,
            })?;

        if config.id2label.is_empty() {
            return Ok(Self::default());
        }
        if config.id2label.len() != 3 {
            return Err(ModelLoadError::Labels(format!(
                "id2label has {} entries",
                config.id2label.len()
            )));
        }

        let mut order = [None; 3];
        for (idx, name) in &config.id2label {
            let Some(slot) = idx.parse::<usize>().ok().and_then(|i| order.get_mut(i)) else {
                return Err(ModelLoadError::Labels(format!("bad label index {idx:?}")));
            };
            match name.parse::<SentimentLabel>() {
                Ok(label) => *slot = Some(label),
                Err(_) => {
                    warn!(label = %name, "unrecognised label name, using default label order");
                    return Ok(Self::default());
                }
            }
        }

        let [Some(a), Some(b), Some(c)] = order else {
            return Err(ModelLoadError::Labels("id2label indices must be 0, 1, 2".into()));
        };
        let layout = Self::new([a, b, c])?;
        info!(order = ?layout.order, "label order from model config");
        Ok(layout)
    }

    /// Assign a probability row to labels.
    pub fn scores(&self, probs: [f32; 3]) -> SentimentScores {
        let mut scores = SentimentScores::new(0.0, 0.0, 0.0);
        for (label, p) in self.order.iter().zip(probs) {
            match label {
                SentimentLabel::Negative => scores.negative = p,
                SentimentLabel::Neutral => scores.neutral = p,
                SentimentLabel::Positive => scores.positive = p,
            }
        }
        scores
    }
}
