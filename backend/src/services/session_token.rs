//! Issues access tokens bound to freshly created sessions.

use crate::{
    config::Config,
    error::AppError,
    models::active_session::{ActiveSession, SessionMetadata},
    services::session_manager::{SessionError, SessionManager},
    types::UserId,
    utils::jwt::create_access_token,
};

const MAX_ISSUE_ATTEMPTS: usize = 3;

#[derive(Debug)]
pub struct IssuedSession {
    pub session: ActiveSession,
    pub access_token: String,
}

/// Creates a session and signs an access token carrying its session token.
///
/// Token collisions are retried with a fresh token a bounded number of times.
pub async fn issue_session_token(
    manager: &SessionManager,
    config: &Config,
    user_id: UserId,
    metadata: SessionMetadata,
) -> Result<IssuedSession, AppError> {
    let mut attempt = 0;
    let session = loop {
        attempt += 1;
        match manager.create_session(user_id, metadata.clone()).await {
            Ok(session) => break session,
            Err(SessionError::TokenCollision) if attempt < MAX_ISSUE_ATTEMPTS => {
                tracing::warn!(attempt, %user_id, "Session token collision, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    };

    let access_token = create_access_token(
        user_id.to_string(),
        Some(session.session_token.clone()),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )?;

    Ok(IssuedSession {
        session,
        access_token,
    })
}
