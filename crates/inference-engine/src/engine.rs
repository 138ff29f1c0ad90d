//! Inference Engine Implementation

use crate::classifier::Classifier;
use crate::scaler::StandardScaler;
use crate::InferenceError;
use feature_engine::FeatureVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Probability at or above which a customer is labelled as churning
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Binary churn outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnLabel {
    /// Customer expected to stay
    NoChurn,
    /// Customer expected to leave
    Churn,
}

impl ChurnLabel {
    /// Numeric class (0 or 1)
    pub const fn as_u8(&self) -> u8 {
        match self {
            ChurnLabel::NoChurn => 0,
            ChurnLabel::Churn => 1,
        }
    }

    /// Display string
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChurnLabel::NoChurn => "No Churn",
            ChurnLabel::Churn => "Churn",
        }
    }
}

/// Prediction result from inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChurnPrediction {
    /// Predicted label
    pub label: ChurnLabel,
    /// Churn probability (0.0 to 1.0)
    pub probability: f64,
}

/// Scores aligned feature vectors with an immutable, pre-loaded model
pub struct InferenceEngine {
    classifier: Box<dyn Classifier>,
    scaler: Option<StandardScaler>,
    decision_threshold: f64,
}

impl InferenceEngine {
    /// Create a new inference engine
    pub fn new(
        classifier: Box<dyn Classifier>,
        scaler: Option<StandardScaler>,
        decision_threshold: f64,
    ) -> Result<Self, InferenceError> {
        if let Some(scaler) = &scaler {
            if scaler.len() != classifier.input_width() {
                return Err(InferenceError::ModelLoadError(format!(
                    "scaler fitted on {} columns but model takes {}",
                    scaler.len(),
                    classifier.input_width()
                )));
            }
        }
        if !(0.0..=1.0).contains(&decision_threshold) {
            return Err(InferenceError::ModelLoadError(format!(
                "decision threshold {} is outside [0, 1]",
                decision_threshold
            )));
        }

        info!(
            "Creating inference engine: backend={}, width={}, scaled={}, threshold={}",
            classifier.backend(),
            classifier.input_width(),
            scaler.is_some(),
            decision_threshold
        );

        Ok(Self {
            classifier,
            scaler,
            decision_threshold,
        })
    }

    /// Score one feature vector. No reindexing happens here: the vector must
    /// already be in model column order.
    pub fn predict(&self, features: &FeatureVector) -> Result<ChurnPrediction, InferenceError> {
        let start = std::time::Instant::now();

        let width = self.input_width();
        if features.len() != width {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("[1, {}]", width),
                actual: format!("[1, {}]", features.len()),
            });
        }

        let probability = match &self.scaler {
            Some(scaler) => self.classifier.predict_proba(&scaler.transform(&features.values))?,
            None => self.classifier.predict_proba(&features.values)?,
        };

        if !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::InferenceFailed(format!(
                "model returned probability {}",
                probability
            )));
        }

        let label = if probability >= self.decision_threshold {
            ChurnLabel::Churn
        } else {
            ChurnLabel::NoChurn
        };

        debug!(
            "Inference completed in {}us: {} (p={:.4})",
            start.elapsed().as_micros(),
            label.as_str(),
            probability
        );

        Ok(ChurnPrediction { label, probability })
    }

    /// Number of input columns
    pub fn input_width(&self) -> usize {
        self.classifier.input_width()
    }

    /// Backend name
    pub fn backend(&self) -> &'static str {
        self.classifier.backend()
    }

    pub fn decision_threshold(&self) -> f64 {
        self.decision_threshold
    }
}
