//! A process-wide engine that loads on first use.
//!
//! Concurrent first callers block on a single load. A failed load is kept and
//! reported to every later caller; it is never retried.

use std::sync::{Arc, Mutex, OnceLock};

use tracing::{error, info};
use tubesense_core::Prediction;

use crate::engine::{InferenceEngine, LogitsModel, PredictOptions};
use crate::error::{EngineError, ModelLoadError};

type Loader<M> = Box<dyn Fn() -> Result<InferenceEngine<M>, ModelLoadError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unloaded,
    Ready,
    Failed,
}

pub struct SharedEngine<M> {
    cell: OnceLock<Result<Mutex<InferenceEngine<M>>, Arc<ModelLoadError>>>,
    loader: Loader<M>,
}

impl<M: LogitsModel> SharedEngine<M> {
    pub fn new(
        loader: impl Fn() -> Result<InferenceEngine<M>, ModelLoadError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            cell: OnceLock::new(),
            loader: Box::new(loader),
        }
    }

    pub fn state(&self) -> EngineState {
        match self.cell.get() {
            None => EngineState::Unloaded,
            Some(Ok(_)) => EngineState::Ready,
            Some(Err(_)) => EngineState::Failed,
        }
    }

    /// The loaded engine, loading it on first call.
    pub fn get(&self) -> Result<&Mutex<InferenceEngine<M>>, EngineError> {
        let loaded = self.cell.get_or_init(|| {
            info!("loading sentiment model");
            (self.loader)().map(Mutex::new).map_err(|e| {
                error!(error = %e, "sentiment model failed to load");
                Arc::new(e)
            })
        });
        match loaded {
            Ok(engine) => Ok(engine),
            Err(e) => Err(EngineError::Load(Arc::clone(e))),
        }
    }

    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Prediction>, EngineError> {
        let mut engine = self.get()?.lock().map_err(|_| EngineError::Poisoned)?;
        Ok(engine.predict(texts))
    }

    pub fn predict_with<S: AsRef<str>>(
        &self,
        texts: &[S],
        options: PredictOptions,
    ) -> Result<Vec<Prediction>, EngineError> {
        let mut engine = self.get()?.lock().map_err(|_| EngineError::Poisoned)?;
        Ok(engine.predict_with(texts, options))
    }

    pub fn predict_single(&self, text: &str) -> Result<Prediction, EngineError> {
        let mut engine = self.get()?.lock().map_err(|_| EngineError::Poisoned)?;
        Ok(engine.predict_single(text))
    }
}

#[cfg(feature = "onnx")]
impl SharedEngine<crate::onnx::OnnxModel> {
    /// An engine that loads the ONNX model described by `config` on first use.
    pub fn from_config(config: crate::engine::EngineConfig) -> Self {
        Self::new(move || InferenceEngine::load(&config))
    }
}
