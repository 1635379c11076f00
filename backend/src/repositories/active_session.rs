//! Session store abstraction and its PostgreSQL implementation.
//!
//! The store is the only code that touches the `active_sessions` table.
//! Deletions report whether a row was affected instead of failing on absence,
//! leaving the "not found" policy to the session manager.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::active_session::{ActiveSession, NewActiveSession};
use crate::types::{SessionId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session token already exists")]
    DuplicateToken,
    #[error("session storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Storage backend for active sessions.
///
/// Use `MockSessionStore` in unit tests to simulate storage failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session, failing with `DuplicateToken` on a token clash.
    async fn insert(&self, session: NewActiveSession) -> Result<ActiveSession, SessionStoreError>;

    /// Sessions of a user still valid at `now`, most recently active first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActiveSession>, SessionStoreError>;

    /// Every session row of a user, expired ones included.
    async fn list_all_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ActiveSession>, SessionStoreError>;

    async fn find_by_id(&self, id: SessionId) -> Result<Option<ActiveSession>, SessionStoreError>;

    async fn find_by_token(&self, token: &str)
        -> Result<Option<ActiveSession>, SessionStoreError>;

    /// Refresh activity of a still-valid session. Returns whether a row matched.
    async fn touch(
        &self,
        token: &str,
        last_activity: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<bool, SessionStoreError>;

    /// Returns whether a row was removed.
    async fn delete_by_token(&self, token: &str) -> Result<bool, SessionStoreError>;

    /// Returns whether a row was removed.
    async fn delete_by_id(&self, id: SessionId) -> Result<bool, SessionStoreError>;

    /// Remove every session with `expires_at <= now`, returning the count.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError>;
}

#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error) -> SessionStoreError {
    let is_unique_violation = err
        .as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false);
    if is_unique_violation {
        SessionStoreError::DuplicateToken
    } else {
        SessionStoreError::Unavailable(err)
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, session: NewActiveSession) -> Result<ActiveSession, SessionStoreError> {
        sqlx::query_as::<_, ActiveSession>(
            r#"
            INSERT INTO active_sessions
                (id, session_token, user_id, device_label, user_agent, ip_address,
                 created_at, last_activity, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8)
            RETURNING id, session_token, user_id, device_label, user_agent, ip_address,
                      created_at, last_activity, expires_at
            "#,
        )
        .bind(session.id)
        .bind(&session.session_token)
        .bind(session.user_id)
        .bind(session.metadata.device_label.as_deref())
        .bind(session.metadata.user_agent.as_deref())
        .bind(session.metadata.ip_address.as_deref())
        .bind(session.created_at)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActiveSession>, SessionStoreError> {
        let sessions = sqlx::query_as::<_, ActiveSession>(
            r#"
            SELECT id, session_token, user_id, device_label, user_agent, ip_address,
                   created_at, last_activity, expires_at
            FROM active_sessions
            WHERE user_id = $1 AND expires_at > $2
            ORDER BY last_activity DESC, created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    async fn list_all_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ActiveSession>, SessionStoreError> {
        let sessions = sqlx::query_as::<_, ActiveSession>(
            r#"
            SELECT id, session_token, user_id, device_label, user_agent, ip_address,
                   created_at, last_activity, expires_at
            FROM active_sessions
            WHERE user_id = $1
            ORDER BY last_activity DESC, created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    async fn find_by_id(&self, id: SessionId) -> Result<Option<ActiveSession>, SessionStoreError> {
        let session = sqlx::query_as::<_, ActiveSession>(
            r#"
            SELECT id, session_token, user_id, device_label, user_agent, ip_address,
                   created_at, last_activity, expires_at
            FROM active_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<ActiveSession>, SessionStoreError> {
        let session = sqlx::query_as::<_, ActiveSession>(
            r#"
            SELECT id, session_token, user_id, device_label, user_agent, ip_address,
                   created_at, last_activity, expires_at
            FROM active_sessions
            WHERE session_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn touch(
        &self,
        token: &str,
        last_activity: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<bool, SessionStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE active_sessions
            SET last_activity = $1,
                expires_at = COALESCE($2, expires_at)
            WHERE session_token = $3 AND expires_at > $1
            "#,
        )
        .bind(last_activity)
        .bind(expires_at)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, SessionStoreError> {
        let result = sqlx::query("DELETE FROM active_sessions WHERE session_token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: SessionId) -> Result<bool, SessionStoreError> {
        let result = sqlx::query("DELETE FROM active_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let result = sqlx::query("DELETE FROM active_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
