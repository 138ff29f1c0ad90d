//! Persisted Model Artifacts

use crate::classifier::{Classifier, LinearClassifier, OnnxClassifier};
use crate::scaler::StandardScaler;
use crate::InferenceError;
use feature_engine::{EncoderTable, ModelColumnSpec};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locations of the artifacts a trained churn model ships with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Classifier: `.onnx` (tract) or `.json` (linear coefficients)
    pub model: PathBuf,
    /// JSON array of model column names, in model order
    pub columns: PathBuf,
    /// JSON object mapping categorical columns to fitted classes
    pub encoders: PathBuf,
    /// Optional JSON standard scaler `{mean, scale}`
    pub scaler: Option<PathBuf>,
}

impl ArtifactPaths {
    /// Resolve artifact file names against a directory
    pub fn in_dir(
        dir: &Path,
        model: &str,
        columns: &str,
        encoders: &str,
        scaler: Option<&str>,
    ) -> Self {
        Self {
            model: dir.join(model),
            columns: dir.join(columns),
            encoders: dir.join(encoders),
            scaler: scaler.map(|s| dir.join(s)),
        }
    }

    pub(crate) fn load_columns(&self) -> Result<ModelColumnSpec, InferenceError> {
        read_json(&self.columns)
    }

    pub(crate) fn load_encoders(&self) -> Result<EncoderTable, InferenceError> {
        read_json(&self.encoders)
    }

    pub(crate) fn load_scaler(&self) -> Result<Option<StandardScaler>, InferenceError> {
        self.scaler
            .as_deref()
            .map(|path| read_json::<StandardScaler>(path).and_then(StandardScaler::checked))
            .transpose()
    }

    /// Load the classifier, choosing the backend by file extension
    pub(crate) fn load_classifier(&self, width: usize) -> Result<Box<dyn Classifier>, InferenceError> {
        let extension = self
            .model
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("onnx") => Ok(Box::new(OnnxClassifier::load(&self.model, width)?)),
            Some("json") => {
                let model: LinearClassifier = read_json(&self.model)?;
                if model.coefficients.len() != width {
                    return Err(InferenceError::ModelLoadError(format!(
                        "{}: {} coefficients for {} columns",
                        self.model.display(),
                        model.coefficients.len(),
                        width
                    )));
                }
                Ok(Box::new(model))
            }
            _ => Err(InferenceError::ModelLoadError(format!(
                "{}: unsupported model format (expected .onnx or .json)",
                self.model.display()
            ))),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InferenceError> {
    debug!("Reading artifact {}", path.display());
    let file = File::open(path)
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))
}
