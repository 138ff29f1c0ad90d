//! Authentication Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::CurrentSession;
use crate::SharedState;

/// Username and password submitted to signup or login
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub username: String,
    pub logged_in_at: DateTime<Utc>,
}

/// Register a new account
pub async fn signup(
    State(state): State<SharedState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let Json(credentials) = payload?;
    let (repository, validator) = {
        let state = state.read().await;
        (state.repository.clone(), state.validator.clone())
    };

    if let Err(errors) = validator
        .validate_credentials(&credentials.username, &credentials.password)
        .into_result()
    {
        metrics::counter!("auth_signups_total", "result" => "invalid").increment(1);
        return Err(ApiError::Validation(errors));
    }

    if !repository
        .create_account(&credentials.username, &credentials.password)
        .await?
    {
        metrics::counter!("auth_signups_total", "result" => "conflict").increment(1);
        return Err(ApiError::AuthConflict(credentials.username));
    }

    metrics::counter!("auth_signups_total", "result" => "created").increment(1);
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            username: credentials.username,
        }),
    ))
}

/// Check credentials and open a session
pub async fn login(
    State(state): State<SharedState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(credentials) = payload?;
    let repository = state.read().await.repository.clone();

    if !repository
        .verify(&credentials.username, &credentials.password)
        .await?
    {
        metrics::counter!("auth_logins_total", "result" => "failure").increment(1);
        warn!("Failed login for {}", credentials.username);
        return Err(ApiError::InvalidCredentials);
    }

    let session = state.write().await.sessions.create(&credentials.username);
    metrics::counter!("auth_logins_total", "result" => "success").increment(1);
    info!("User {} logged in", session.username);

    Ok(Json(LoginResponse {
        token: session.token,
        username: session.username,
    }))
}

/// Close the caller's session
pub async fn logout(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
) -> StatusCode {
    state.write().await.sessions.remove(&session.token);
    info!("User {} logged out", session.username);
    StatusCode::NO_CONTENT
}

/// Who is logged in
pub async fn current_session(CurrentSession(session): CurrentSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        username: session.username,
        logged_in_at: session.created_at,
    })
}
