//! Customer Lookup Route

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::error::ApiError;
use crate::session::CurrentSession;
use crate::SharedState;
use storage::CustomerRecord;

/// One customer joined across all tables
pub async fn get_customer(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(customer_id): Path<String>,
) -> Result<Json<CustomerRecord>, ApiError> {
    debug!("{} looked up customer {}", session.username, customer_id);
    let repository = state.read().await.repository.clone();

    repository
        .lookup_customer(customer_id.trim())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Customer ID {} not found", customer_id)))
}
