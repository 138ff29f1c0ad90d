//! End-to-End Churn Predictor

use crate::artifacts::ArtifactPaths;
use crate::engine::{ChurnPrediction, InferenceEngine};
use crate::{InferenceError, PredictError};
use feature_engine::{CustomerProfile, FeatureAssembler, RawAttributes};
use tracing::{info, warn};

/// Feature assembler and inference engine built from one artifact set
pub struct ChurnPredictor {
    assembler: FeatureAssembler,
    engine: InferenceEngine,
}

impl ChurnPredictor {
    /// Pair an assembler with an engine of matching width
    pub fn new(assembler: FeatureAssembler, engine: InferenceEngine) -> Result<Self, InferenceError> {
        if assembler.spec().len() != engine.input_width() {
            return Err(InferenceError::ModelLoadError(format!(
                "column spec has {} columns but model takes {}",
                assembler.spec().len(),
                engine.input_width()
            )));
        }
        Ok(Self { assembler, engine })
    }

    /// Load every artifact once; the result is immutable for the process lifetime
    pub fn load(paths: &ArtifactPaths, decision_threshold: f64) -> Result<Self, InferenceError> {
        let spec = paths.load_columns()?;
        let encoders = paths.load_encoders()?;
        let scaler = paths.load_scaler()?;
        let classifier = paths.load_classifier(spec.len())?;

        let engine = InferenceEngine::new(classifier, scaler, decision_threshold)?;
        let predictor = Self::new(FeatureAssembler::new(spec, encoders), engine)?;

        info!(
            "Churn model loaded from {} ({} columns, {} encoders)",
            paths.model.display(),
            predictor.assembler.spec().len(),
            predictor.assembler.encoders().len()
        );
        Ok(predictor)
    }

    /// Assemble and score raw attributes. An encoding failure aborts before scoring.
    pub fn predict_attributes(&self, raw: &RawAttributes) -> Result<ChurnPrediction, PredictError> {
        let features = self.assembler.assemble(raw).map_err(|e| {
            warn!("Rejecting prediction request: {}", e);
            e
        })?;
        Ok(self.engine.predict(&features)?)
    }

    /// Score a validated form profile
    pub fn predict_profile(&self, profile: &CustomerProfile) -> Result<ChurnPrediction, PredictError> {
        self.predict_attributes(&profile.to_raw_attributes())
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }
}
