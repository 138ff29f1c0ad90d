//! Login Sessions
//!
//! Each successful login creates one [`Session`] keyed by an opaque bearer
//! token. Sessions older than the store's TTL no longer authenticate and are
//! purged on the next login. Protected handlers take a [`CurrentSession`]
//! extractor.

use crate::error::ApiError;
use crate::SharedState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// An authenticated user's session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub token: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Session lifetime when none is configured
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 12 * 60;

/// Registry of live sessions
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<Uuid, Session>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.created_at >= self.ttl
    }

    /// Drop expired sessions; returns how many were removed
    pub fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let ttl = self.ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| now - session.created_at < ttl);
        before - self.sessions.len()
    }

    /// Open a session for a user who just logged in
    pub fn create(&mut self, username: &str) -> Session {
        let purged = self.purge_expired();
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }

        let session = Session {
            token: Uuid::new_v4(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        self.sessions.insert(session.token, session.clone());
        session
    }

    /// Live session for `token`; expired sessions are not returned
    pub fn get(&self, token: &Uuid) -> Option<&Session> {
        let now = Utc::now();
        self.sessions
            .get(token)
            .filter(|session| !self.is_expired(session, now))
    }

    /// End a session; returns it if it existed
    pub fn remove(&mut self, token: &Uuid) -> Option<Session> {
        self.sessions.remove(token)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Session of the caller, resolved from `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<SharedState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| Uuid::parse_str(token.trim()).ok())
            .ok_or(ApiError::Unauthorized)?;

        let state = state.read().await;
        match state.sessions.get(&token) {
            Some(session) => Ok(CurrentSession(session.clone())),
            None => {
                debug!("Rejected unknown session token");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_remove() {
        let mut store = SessionStore::new();
        let session = store.create("alice");

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&session.token).map(|s| s.username.as_str()), Some("alice"));

        assert_eq!(store.remove(&session.token), Some(session.clone()));
        assert!(store.get(&session.token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_tokens_are_unique_per_login() {
        let mut store = SessionStore::new();
        let first = store.create("alice");
        let second = store.create("alice");

        assert_ne!(first.token, second.token);
        assert_eq!(store.len(), 2);

        store.remove(&first.token);
        assert!(store.get(&second.token).is_some());
    }

    #[test]
    fn test_expired_sessions_do_not_authenticate() {
        let mut store = SessionStore::with_ttl(Duration::zero());
        let session = store.create("alice");

        assert!(store.get(&session.token).is_none());
    }

    #[test]
    fn test_repeated_logins_do_not_accumulate() {
        let mut store = SessionStore::with_ttl(Duration::zero());
        for _ in 0..50 {
            store.create("alice");
        }
        assert_eq!(store.len(), 1);

        assert_eq!(store.purge_expired(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_live_sessions_survive_purge() {
        let mut store = SessionStore::with_ttl(Duration::hours(1));
        let session = store.create("alice");

        assert_eq!(store.purge_expired(), 0);
        assert!(store.get(&session.token).is_some());
    }
}
