//! Table Browsing Routes

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::ApiError;
use crate::session::CurrentSession;
use crate::SharedState;
use storage::{CustomerTable, TableData};

/// Response for the table listing
#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub tables: Vec<&'static str>,
}

/// Names of the browsable customer tables
pub async fn list_tables(_session: CurrentSession) -> Json<TablesResponse> {
    Json(TablesResponse {
        tables: CustomerTable::ALL.iter().map(|t| t.name()).collect(),
    })
}

/// All rows of one table
pub async fn get_table(
    State(state): State<SharedState>,
    _session: CurrentSession,
    Path(name): Path<String>,
) -> Result<Json<TableData>, ApiError> {
    let table: CustomerTable = name.parse()?;
    let repository = state.read().await.repository.clone();
    Ok(Json(repository.scan_table(table).await?))
}
