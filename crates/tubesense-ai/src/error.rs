use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Failure while bringing a model into memory. Fatal for the engine.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("{file} not found in {dir:?}")]
    MissingFile { dir: PathBuf, file: &'static str },

    #[error("model runtime error: {0}")]
    Runtime(String),

    #[error("invalid model config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model must have exactly 3 sentiment labels: {0}")]
    Labels(String),

    #[error("neutral threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f32),
}

/// Failure to use a shared engine.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// The one-time load failed; every later call reports the same error.
    #[error("sentiment model failed to load: {0}")]
    Load(Arc<ModelLoadError>),

    #[error("inference engine lock poisoned")]
    Poisoned,
}
