//! Sentiment inference: batched sequence classification with a neutral-biased
//! decision rule, loaded once per process.

pub mod decision;
pub mod engine;
pub mod error;
pub mod labels;
pub mod shared;
pub mod threshold;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;

pub use engine::{EngineConfig, InferenceEngine, LogitsModel, PredictOptions};
pub use error::{EngineError, ModelLoadError};
pub use labels::LabelLayout;
pub use shared::{EngineState, SharedEngine};
pub use threshold::{DEFAULT_NEUTRAL_THRESHOLD, NeutralThreshold};
