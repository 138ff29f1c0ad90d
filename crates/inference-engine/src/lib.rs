//! Churn Inference Engine
//!
//! Loads the persisted model artifacts once and scores assembled feature vectors.

mod artifacts;
mod classifier;
mod engine;
mod predictor;
mod scaler;

pub use artifacts::ArtifactPaths;
pub use classifier::{Classifier, LinearClassifier, OnnxClassifier};
pub use engine::{ChurnLabel, ChurnPrediction, InferenceEngine, DEFAULT_DECISION_THRESHOLD};
pub use predictor::ChurnPredictor;
pub use scaler::StandardScaler;

use feature_engine::AssemblyError;
use thiserror::Error;

/// Errors during artifact loading or inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
}

/// Errors running the full prediction pipeline
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}
