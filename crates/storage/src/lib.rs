//! Storage Layer
//!
//! SQLite persistence for the account store and the six customer tables.

mod customers;
mod loader;
mod repository;
mod schema;
mod users;
mod value;

pub use loader::LoadSummary;
pub use repository::Repository;
pub use schema::{Column, CustomerTable, SqlType, CUSTOMER_ID};
pub use value::{CellValue, CustomerRecord, RecordField, TableData};

use std::path::PathBuf;
use thiserror::Error;

/// bcrypt work factor used unless configured otherwise
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("CSV error in {}: {message}", path.display())]
    Csv { path: PathBuf, message: String },
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::DatabaseError(err.to_string())
    }
}
