//! Session lifecycle management.
//!
//! `SessionManager` is the only component allowed to mutate the session store.
//! A session is either active or absent; rows that have expired but not yet
//! been swept are hidden from listing and validation until the sweep removes
//! them.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::config::{Config, DEFAULT_SESSION_TTL_HOURS};
use crate::models::active_session::{ActiveSession, NewActiveSession, SessionMetadata};
use crate::repositories::active_session::{SessionStore, SessionStoreError};
use crate::types::{SessionId, UserId};
use crate::utils::token::generate_session_token;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The generated token already exists. Callers may retry with a new token.
    #[error("generated session token collides with an existing session")]
    TokenCollision,
    #[error("session storage failure: {0}")]
    Storage(#[source] SessionStoreError),
    /// The configured lifetime pushes the expiry past the representable range.
    #[error("session expiry is out of range")]
    ExpiryOutOfRange,
}

impl From<SessionStoreError> for SessionError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::DuplicateToken => SessionError::TokenCollision,
            other => SessionError::Storage(other),
        }
    }
}

/// Result of revoking several sessions one delete at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevokeOutcome {
    pub removed: u64,
    pub failed: u64,
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    sliding_expiration: bool,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            sliding_expiration: false,
        }
    }

    pub fn from_config(store: Arc<dyn SessionStore>, config: &Config) -> Self {
        let ttl = i64::try_from(config.session_ttl_hours)
            .ok()
            .filter(|hours| *hours > 0)
            .and_then(Duration::try_hours)
            .unwrap_or_else(|| Duration::hours(DEFAULT_SESSION_TTL_HOURS as i64));
        Self::new(store, ttl)
            .with_sliding_expiration(config.session_sliding_expiration)
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, SessionError> {
        now.checked_add_signed(self.ttl)
            .ok_or(SessionError::ExpiryOutOfRange)
    }

    pub fn with_sliding_expiration(mut self, enabled: bool) -> Self {
        self.sliding_expiration = enabled;
        self
    }

    pub async fn create_session(
        &self,
        user_id: UserId,
        metadata: SessionMetadata,
    ) -> Result<ActiveSession, SessionError> {
        let now = Utc::now();
        let expires_at = self.expiry_from(now)?;
        let session = self
            .store
            .insert(NewActiveSession {
                id: SessionId::new(),
                session_token: generate_session_token(),
                user_id,
                metadata,
                created_at: now,
                expires_at,
            })
            .await?;
        tracing::debug!(session_id = %session.id, %user_id, "Created session");
        Ok(session)
    }

    /// Active sessions of a user, most recently active first.
    pub async fn get_user_sessions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ActiveSession>, SessionError> {
        Ok(self.store.list_for_user(user_id, Utc::now()).await?)
    }

    pub async fn find_session(&self, id: SessionId) -> Result<Option<ActiveSession>, SessionError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Returns the session behind `token` if it exists and has not expired.
    pub async fn validate_session(
        &self,
        token: &str,
    ) -> Result<Option<ActiveSession>, SessionError> {
        let now = Utc::now();
        let session = self.store.find_by_token(token).await?;
        Ok(session.filter(|s| s.is_active_at(now)))
    }

    /// Records activity on a session, sliding its expiry when enabled.
    pub async fn touch_session(&self, token: &str) -> Result<bool, SessionError> {
        let now = Utc::now();
        let expires_at = if self.sliding_expiration {
            Some(self.expiry_from(now)?)
        } else {
            None
        };
        Ok(self.store.touch(token, now, expires_at).await?)
    }

    /// Deletes the session behind `token`. A missing session is not an error.
    pub async fn remove_session(&self, token: &str) -> Result<(), SessionError> {
        let removed = self.store.delete_by_token(token).await?;
        if !removed {
            tracing::debug!("Session already absent on removal");
        }
        Ok(())
    }

    /// Deletes a session by id. A missing session is not an error.
    pub async fn remove_session_by_id(&self, id: SessionId) -> Result<(), SessionError> {
        let removed = self.store.delete_by_id(id).await?;
        if !removed {
            tracing::debug!(session_id = %id, "Session already absent on removal");
        }
        Ok(())
    }

    /// Revokes every session of the user except `current_token`.
    ///
    /// With no current token, every session is revoked. Each delete stands on
    /// its own; failures are counted, not propagated.
    pub async fn remove_other_sessions(
        &self,
        user_id: UserId,
        current_token: Option<&str>,
    ) -> Result<RevokeOutcome, SessionError> {
        let sessions = self.store.list_all_for_user(user_id).await?;
        let mut outcome = RevokeOutcome::default();

        for session in sessions
            .iter()
            .filter(|s| current_token != Some(s.session_token.as_str()))
        {
            match self.store.delete_by_id(session.id).await {
                Ok(true) => outcome.removed += 1,
                Ok(false) => {
                    tracing::debug!(session_id = %session.id, "Session removed concurrently");
                }
                Err(err) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        error = ?err,
                        session_id = %session.id,
                        %user_id,
                        "Failed to revoke session"
                    );
                }
            }
        }

        Ok(outcome)
    }

    /// Sweeps every session whose expiry has passed.
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, SessionError> {
        self.cleanup_expired_sessions_at(Utc::now()).await
    }

    pub async fn cleanup_expired_sessions_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, SessionError> {
        let deleted = self.store.delete_expired(now).await?;
        if deleted > 0 {
            tracing::info!(deleted, "Deleted expired sessions");
        }
        Ok(deleted)
    }
}
