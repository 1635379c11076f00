//! In-process session store used by tests and `SESSION_STORE=memory` setups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::active_session::{SessionStore, SessionStoreError};
use crate::models::active_session::{ActiveSession, NewActiveSession};
use crate::types::{SessionId, UserId};

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, ActiveSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn sort_most_recent_first(sessions: &mut [ActiveSession]) {
    sessions.sort_by_key(|s| (Reverse(s.last_activity), Reverse(s.created_at), Reverse(s.id)));
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: NewActiveSession) -> Result<ActiveSession, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let clash = sessions.contains_key(&session.id)
            || sessions
                .values()
                .any(|existing| existing.session_token == session.session_token);
        if clash {
            return Err(SessionStoreError::DuplicateToken);
        }
        let session = session.into_session();
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActiveSession>, SessionStoreError> {
        let mut found: Vec<ActiveSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id && s.is_active_at(now))
            .cloned()
            .collect();
        sort_most_recent_first(&mut found);
        Ok(found)
    }

    async fn list_all_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ActiveSession>, SessionStoreError> {
        let mut found: Vec<ActiveSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sort_most_recent_first(&mut found);
        Ok(found)
    }

    async fn find_by_id(&self, id: SessionId) -> Result<Option<ActiveSession>, SessionStoreError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<ActiveSession>, SessionStoreError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.session_token == token)
            .cloned())
    }

    async fn touch(
        &self,
        token: &str,
        last_activity: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<bool, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions
            .values_mut()
            .find(|s| s.session_token == token && s.is_active_at(last_activity))
        else {
            return Ok(false);
        };
        session.last_activity = last_activity;
        if let Some(expires_at) = expires_at {
            session.expires_at = expires_at;
        }
        Ok(true)
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.session_token != token);
        Ok(sessions.len() < before)
    }

    async fn delete_by_id(&self, id: SessionId) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.is_active_at(now));
        Ok((before - sessions.len()) as u64)
    }
}
