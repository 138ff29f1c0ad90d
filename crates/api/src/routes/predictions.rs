//! Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::session::CurrentSession;
use crate::SharedState;
use feature_engine::CustomerProfile;
use inference_engine::PredictError;

/// Response for the prediction endpoint
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    /// 1 for churn, 0 otherwise
    pub label: u8,
    pub outcome: &'static str,
    pub probability: f64,
}

/// Score a submitted customer profile
pub async fn create_prediction(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    payload: Result<Json<CustomerProfile>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(profile) = payload?;
    let (predictor, validator) = {
        let state = state.read().await;
        (state.predictor.clone(), state.validator.clone())
    };
    let predictor =
        predictor.ok_or_else(|| ApiError::NotFound("Prediction model is not loaded".to_string()))?;

    let profile = profile.validated(&validator).map_err(ApiError::Validation)?;

    let prediction = predictor.predict_profile(&profile).map_err(|e| {
        if matches!(e, PredictError::Assembly(_)) {
            metrics::counter!("churn_encoding_errors_total").increment(1);
        }
        ApiError::from(e)
    })?;

    metrics::counter!("churn_predictions_total", "outcome" => prediction.label.as_str())
        .increment(1);
    debug!("Prediction for {}: {:?}", session.username, prediction);
    info!(
        "Prediction served: {} ({:.2})",
        prediction.label.as_str(),
        prediction.probability
    );

    Ok(Json(PredictionResponse {
        label: prediction.label.as_u8(),
        outcome: prediction.label.as_str(),
        probability: prediction.probability,
    }))
}
