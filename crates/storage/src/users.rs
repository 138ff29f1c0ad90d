//! Account Store

use crate::repository::Repository;
use crate::StorageError;
use tracing::{debug, info, warn};

impl Repository {
    /// Register a new account. Returns `false` if the username is taken, in
    /// which case the existing account is left untouched.
    pub async fn create_account(&self, username: &str, password: &str) -> Result<bool, StorageError> {
        let hash = hash_password(password.to_string(), self.bcrypt_cost).await?;

        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(&hash)
            .execute(&mut *conn)
            .await;

        match result {
            Ok(_) => {
                info!("Account created: {}", username);
                Ok(true)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                warn!("Signup rejected, username already exists: {}", username);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check a password against the stored hash. Unknown users fail.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, StorageError> {
        let stored: Option<String> = {
            let mut conn = self.pool.acquire().await?;
            sqlx::query_scalar("SELECT password FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&mut *conn)
                .await?
        };

        let Some(hash) = stored else {
            debug!("Login attempt for unknown user {}", username);
            return Ok(false);
        };

        verify_password(password.to_string(), hash).await
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String, StorageError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| StorageError::Hashing(e.to_string()))?
        .map_err(|e| StorageError::Hashing(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, StorageError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| StorageError::Hashing(e.to_string()))?
        .map_err(|e| StorageError::Hashing(e.to_string()))
}
