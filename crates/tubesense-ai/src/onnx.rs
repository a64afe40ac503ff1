//! ONNX Runtime sequence classifier for transformer sentiment models.
//!
//! The model directory must contain `model.onnx` and `tokenizer.json`.
//! The model must emit logits shaped `[batch, 3]`.

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{PaddingStrategy, Tokenizer, TruncationParams};
use tracing::info;

use crate::engine::{EngineConfig, InferenceEngine, LogitsModel};
use crate::error::ModelLoadError;

pub struct OnnxModel {
    session: Session,
    tokenizer: Tokenizer,
    pad_id: i64,
    max_length: Option<usize>,
    wants_type_ids: bool,
}

impl OnnxModel {
    /// Load `model.onnx` and `tokenizer.json` from a directory.
    pub fn load(model_dir: &Path) -> Result<Self, ModelLoadError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        for (path, file) in [(&model_path, "model.onnx"), (&tokenizer_path, "tokenizer.json")] {
            if !path.exists() {
                return Err(ModelLoadError::MissingFile {
                    dir: model_dir.to_path_buf(),
                    file,
                });
            }
        }

        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(&model_path))
            .map_err(|e| ModelLoadError::Runtime(format!("load {}: {e}", model_path.display())))?;

        let classes = session.outputs().first().and_then(|o| infer_classes(o.dtype()));
        if let Some(classes) = classes.filter(|&c| c != 3) {
            return Err(ModelLoadError::Labels(format!("model has {classes} output classes")));
        }
        let wants_type_ids = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ModelLoadError::Runtime(format!("load tokenizer: {e}")))?;

        // Keep the tokenizer's own pad token; pad each batch to its longest text.
        let mut padding = tokenizer.get_padding().cloned().unwrap_or_default();
        padding.strategy = PaddingStrategy::BatchLongest;
        let pad_id = padding.pad_id as i64;
        tokenizer.with_padding(Some(padding));

        info!(model = %model_path.display(), wants_type_ids, "loaded sentiment model");
        Ok(Self {
            session,
            tokenizer,
            pad_id,
            max_length: None,
            wants_type_ids,
        })
    }

    fn set_max_length(&mut self, max_length: usize) -> anyhow::Result<()> {
        if self.max_length == Some(max_length) {
            return Ok(());
        }
        self.tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        self.max_length = Some(max_length);
        Ok(())
    }
}

impl LogitsModel for OnnxModel {
    fn forward(&mut self, texts: &[&str], max_length: usize) -> anyhow::Result<Vec<[f32; 3]>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        self.set_max_length(max_length)?;

        let batch_size = texts.len();
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        // Flat [batch_size, seq_len] inputs.
        let mut input_ids = vec![self.pad_id; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        let mut token_type_ids = vec![0i64; batch_size * seq_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let offset = i * seq_len;
            for (j, &id) in encoding.get_ids().iter().enumerate() {
                input_ids[offset + j] = id as i64;
            }
            for (j, &mask) in encoding.get_attention_mask().iter().enumerate() {
                attention_mask[offset + j] = mask as i64;
            }
            for (j, &tid) in encoding.get_type_ids().iter().enumerate() {
                token_type_ids[offset + j] = tid as i64;
            }
        }

        let shape = [batch_size as i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.into_boxed_slice()))?;

        // XLM-R style models take no token_type_ids.
        let outputs = if self.wants_type_ids {
            let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;
            self.session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])?
        } else {
            self.session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
            ])?
        };

        let (output_shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[0] as usize == batch_size && dims[1] == 3,
            "unexpected output shape: {dims:?}, expected [{batch_size}, 3]"
        );

        Ok(logits
            .chunks_exact(3)
            .map(|row| [row[0], row[1], row[2]])
            .collect())
    }
}

impl InferenceEngine<OnnxModel> {
    /// Load the ONNX model and its inference settings from `config.model_dir`.
    pub fn load(config: &EngineConfig) -> Result<Self, ModelLoadError> {
        let model = OnnxModel::load(&config.model_dir)?;
        Self::from_config(model, config)
    }
}

/// Number of classes from the logits output type, when the model declares it.
fn infer_classes(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
