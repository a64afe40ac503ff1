//! Batched sentiment inference over any model that yields three logits per text.

use std::path::PathBuf;

use tracing::{debug, error};
use tubesense_core::Prediction;

use crate::decision::{decide, softmax};
use crate::error::ModelLoadError;
use crate::labels::LabelLayout;
use crate::threshold::NeutralThreshold;

/// A sequence classifier producing raw logits in model label order.
pub trait LogitsModel: Send {
    /// Run one batch. Texts longer than `max_length` tokens are truncated.
    fn forward(&mut self, texts: &[&str], max_length: usize) -> anyhow::Result<Vec<[f32; 3]>>;
}

/// Per-call inference settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictOptions {
    pub max_length: usize,
    pub batch_size: usize,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            max_length: 160,
            batch_size: 32,
        }
    }
}

/// Where the model lives and how it should be interpreted.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub model_dir: PathBuf,
    /// Overrides `t_neu` from the model directory when set.
    pub neutral_threshold: Option<f32>,
    /// Overrides `id2label` from the model directory when set.
    pub labels: Option<LabelLayout>,
    pub options: PredictOptions,
}

pub struct InferenceEngine<M> {
    model: M,
    labels: LabelLayout,
    threshold: NeutralThreshold,
    options: PredictOptions,
}

impl<M: LogitsModel> InferenceEngine<M> {
    pub fn new(
        model: M,
        labels: LabelLayout,
        threshold: NeutralThreshold,
        options: PredictOptions,
    ) -> Self {
        Self {
            model,
            labels,
            threshold,
            options,
        }
    }

    /// Wrap an already-loaded model, reading threshold and label layout from
    /// the config's model directory unless overridden.
    pub fn from_config(model: M, config: &EngineConfig) -> Result<Self, ModelLoadError> {
        let threshold = NeutralThreshold::resolve(config.neutral_threshold, &config.model_dir)?;
        let labels = match config.labels {
            Some(labels) => labels,
            None => LabelLayout::from_model_dir(&config.model_dir)?,
        };
        Ok(Self::new(model, labels, threshold, config.options))
    }

    pub fn threshold(&self) -> NeutralThreshold {
        self.threshold
    }

    pub fn labels(&self) -> &LabelLayout {
        &self.labels
    }

    #[cfg(test)]
    pub(crate) fn model(&self) -> &M {
        &self.model
    }

    /// Classify texts with the engine's default options.
    pub fn predict<S: AsRef<str>>(&mut self, texts: &[S]) -> Vec<Prediction> {
        self.predict_with(texts, self.options)
    }

    /// Classify texts, one prediction per input in input order.
    ///
    /// A batch that fails yields placeholder predictions for its texts and
    /// the remaining batches still run.
    pub fn predict_with<S: AsRef<str>>(&mut self, texts: &[S], options: PredictOptions) -> Vec<Prediction> {
        let mut predictions = Vec::with_capacity(texts.len());
        let batch_size = options.batch_size.max(1);

        for (index, chunk) in texts.chunks(batch_size).enumerate() {
            let batch: Vec<&str> = chunk.iter().map(AsRef::as_ref).collect();
            match self.run_batch(&batch, options.max_length) {
                Ok(batch_predictions) => predictions.extend(batch_predictions),
                Err(e) => {
                    error!(batch = index, size = batch.len(), error = %e, "batch inference failed, using placeholders");
                    predictions.extend(std::iter::repeat_n(Prediction::placeholder(), batch.len()));
                }
            }
        }

        debug!(texts = texts.len(), batch_size, "inference complete");
        predictions
    }

    pub fn predict_single(&mut self, text: &str) -> Prediction {
        self.predict(&[text])
            .into_iter()
            .next()
            .unwrap_or_else(Prediction::placeholder)
    }

    fn run_batch(&mut self, batch: &[&str], max_length: usize) -> anyhow::Result<Vec<Prediction>> {
        let logits = self.model.forward(batch, max_length)?;
        anyhow::ensure!(
            logits.len() == batch.len(),
            "model returned {} rows for {} texts",
            logits.len(),
            batch.len()
        );
        anyhow::ensure!(
            logits.iter().flatten().all(|x| x.is_finite()),
            "model returned non-finite logits"
        );
        Ok(logits
            .into_iter()
            .map(|row| decide(softmax(row), &self.labels, self.threshold))
            .collect())
    }
}
