//! Standard Scaler

use crate::InferenceError;
use serde::{Deserialize, Serialize};

/// Per-column `(x - mean) / scale` transform fitted at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Create a scaler, rejecting mismatched lengths and zero or non-finite scales
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, InferenceError> {
        if mean.len() != scale.len() {
            return Err(InferenceError::ModelLoadError(format!(
                "scaler has {} means but {} scales",
                mean.len(),
                scale.len()
            )));
        }
        if let Some(idx) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(InferenceError::ModelLoadError(format!(
                "scaler scale at position {} is {}",
                idx, scale[idx]
            )));
        }
        Ok(Self { mean, scale })
    }

    /// Number of columns the scaler was fitted on
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Scale a row; missing cells stay missing. Caller guarantees the length.
    pub fn transform(&self, row: &[Option<f64>]) -> Vec<Option<f64>> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| value.map(|x| (x - mean) / scale))
            .collect()
    }

    /// Re-validate after deserialization
    pub(crate) fn checked(self) -> Result<Self, InferenceError> {
        Self::new(self.mean, self.scale)
    }
}
