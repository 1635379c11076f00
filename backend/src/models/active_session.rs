//! Models for tracking active user sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{SessionId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
/// Database representation of an active user session.
pub struct ActiveSession {
    /// Unique identifier for the session record.
    pub id: SessionId,
    /// Opaque credential embedded in the caller's access token as `sid`.
    pub session_token: String,
    /// User ID associated with the session.
    pub user_id: UserId,
    /// Optional label identifying the client/device.
    pub device_label: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    /// Timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last authenticated request made with the session.
    pub last_activity: DateTime<Utc>,
    /// Timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl ActiveSession {
    /// A session stays valid only while its expiry lies strictly in the future.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Device details captured when a session is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub device_label: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Row to be inserted by a session store.
#[derive(Debug, Clone)]
pub struct NewActiveSession {
    pub id: SessionId,
    pub session_token: String,
    pub user_id: UserId,
    pub metadata: SessionMetadata,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewActiveSession {
    pub fn into_session(self) -> ActiveSession {
        ActiveSession {
            id: self.id,
            session_token: self.session_token,
            user_id: self.user_id,
            device_label: self.metadata.device_label,
            user_agent: self.metadata.user_agent,
            ip_address: self.metadata.ip_address,
            created_at: self.created_at,
            last_activity: self.created_at,
            expires_at: self.expires_at,
        }
    }
}
