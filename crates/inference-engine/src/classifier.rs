//! Classifier Backends

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::info;

/// A trained binary classifier with a fixed input width
pub trait Classifier: Send + Sync {
    /// Probability of the churn class for one scaled, aligned row
    fn predict_proba(&self, row: &[Option<f64>]) -> Result<f64, InferenceError>;

    /// Number of input columns
    fn input_width(&self) -> usize;

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}

/// Logistic regression exported as coefficients plus intercept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl Classifier for LinearClassifier {
    fn predict_proba(&self, row: &[Option<f64>]) -> Result<f64, InferenceError> {
        // Missing cells contribute nothing (mean-imputed after scaling).
        let z = self
            .coefficients
            .iter()
            .zip(row)
            .fold(self.intercept, |acc, (w, x)| acc + w * x.unwrap_or(0.0));
        Ok(1.0 / (1.0 + (-z).exp()))
    }

    fn input_width(&self) -> usize {
        self.coefficients.len()
    }

    fn backend(&self) -> &'static str {
        "linear"
    }
}

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX classifier run through tract
pub struct OnnxClassifier {
    plan: OnnxPlan,
    width: usize,
}

impl OnnxClassifier {
    /// Load and optimize an ONNX model taking a `f32[1, width]` input
    pub fn load(path: &Path, width: usize) -> Result<Self, InferenceError> {
        info!("Loading ONNX model {} (width={})", path.display(), width);

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| Self::plan(model, width))
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        Ok(Self { plan, width })
    }

    /// Optimize an already-parsed model taking a `f32[1, width]` input
    pub fn from_model(model: InferenceModel, width: usize) -> Result<Self, InferenceError> {
        let plan = Self::plan(model, width)
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;
        Ok(Self { plan, width })
    }

    fn plan(model: InferenceModel, width: usize) -> TractResult<OnnxPlan> {
        model
            .with_input_fact(0, f32::fact([1, width]).into())?
            .into_optimized()?
            .into_runnable()
    }
}

impl Classifier for OnnxClassifier {
    fn predict_proba(&self, row: &[Option<f64>]) -> Result<f64, InferenceError> {
        let values: Vec<f32> = row
            .iter()
            .map(|cell| cell.map_or(f32::NAN, |x| x as f32))
            .collect();

        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.width), values)
            .map_err(|e| InferenceError::InvalidInputShape {
                expected: format!("[1, {}]", self.width),
                actual: e.to_string(),
            })?
            .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        // Classifier exports put probabilities in the last float output.
        let probabilities = outputs
            .iter()
            .rev()
            .find(|t| t.datum_type() == f32::datum_type())
            .ok_or_else(|| {
                InferenceError::InferenceFailed("model produced no float output".to_string())
            })?;
        let probabilities = probabilities
            .as_slice::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        match probabilities {
            [_, positive, ..] => Ok(f64::from(*positive)),
            [single] => Ok(f64::from(*single)),
            [] => Err(InferenceError::InferenceFailed(
                "model produced an empty probability output".to_string(),
            )),
        }
    }

    fn input_width(&self) -> usize {
        self.width
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }
}
