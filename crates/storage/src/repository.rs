//! Repository Implementation

use crate::schema::{quote, CustomerTable};
use crate::{StorageError, DEFAULT_BCRYPT_COST};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

/// SQLite repository for accounts and customer tables.
///
/// Backed by a single connection; every operation acquires it for one
/// statement (or one transaction) and releases it on return.
#[derive(Debug, Clone)]
pub struct Repository {
    pub(crate) pool: SqlitePool,
    pub(crate) bcrypt_cost: u32,
}

impl Repository {
    /// Open (creating if needed) a database file
    pub async fn open(path: &str) -> Result<Self, StorageError> {
        info!("Opening SQLite database at {}", path);
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect(options).await
    }

    /// Create an in-memory database (useful for testing)
    pub async fn in_memory() -> Result<Self, StorageError> {
        debug!("Creating in-memory SQLite database");
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, StorageError> {
        // One long-lived connection: an in-memory database lives only as long as it does.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let repository = Self {
            pool,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        };
        repository.initialize_schema().await?;
        Ok(repository)
    }

    /// Override the bcrypt work factor used for new accounts
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    async fn initialize_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                password TEXT NOT NULL
            )",
        )
        .execute(&mut *conn)
        .await?;

        for table in CustomerTable::ALL {
            sqlx::query(&table.create_sql()).execute(&mut *conn).await?;
        }

        debug!("Schema initialized");
        Ok(())
    }

    /// Cheap connectivity check
    pub async fn ping(&self) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }

    /// Number of rows in a customer table
    pub async fn row_count(&self, table: CustomerTable) -> Result<i64, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", quote(table.name())))
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    /// Number of registered accounts
    pub async fn user_count(&self) -> Result<i64, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_schema() {
        let repo = Repository::in_memory().await.unwrap();
        repo.ping().await.unwrap();

        assert_eq!(repo.user_count().await.unwrap(), 0);
        for table in CustomerTable::ALL {
            assert_eq!(repo.row_count(table).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let path = std::env::temp_dir().join(format!("churn-repo-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let path = path.to_string_lossy().to_string();

        {
            let repo = Repository::open(&path).await.unwrap().with_bcrypt_cost(4);
            assert!(repo.create_account("alice", "password123").await.unwrap());
            repo.pool.close().await;
        }

        let repo = Repository::open(&path).await.unwrap();
        assert_eq!(repo.user_count().await.unwrap(), 1);
        let _ = std::fs::remove_file(&path);
    }
}
