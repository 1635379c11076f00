use axum::{
    extract::{Extension, Path, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    middleware::auth::CurrentUser,
    models::active_session::ActiveSession,
    state::AppState,
    types::SessionId,
    utils::token::secrets_match,
};

pub const CLEANUP_SECRET_HEADER: &str = "x-cleanup-secret";

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub device_label: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_current: bool,
}

impl SessionResponse {
    fn from_session(session: ActiveSession, current: &CurrentUser) -> Self {
        let is_current = current.is_current_session(&session.session_token);
        Self {
            id: session.id.to_string(),
            device_label: session.device_label,
            user_agent: session.user_agent,
            ip_address: session.ip_address,
            created_at: session.created_at,
            last_activity: session.last_activity,
            expires_at: session.expires_at,
            is_current,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevokeSessionsResponse {
    pub removed_count: u64,
    pub failed_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupSessionsResponse {
    pub deleted_count: u64,
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let sessions = state.sessions.get_user_sessions(current.user_id).await?;
    let responses = sessions
        .into_iter()
        .map(|session| SessionResponse::from_session(session, &current))
        .collect();
    Ok(Json(responses))
}

/// Revokes every session of the caller except the one making the request.
pub async fn revoke_other_sessions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<RevokeSessionsResponse>, AppError> {
    let outcome = state
        .sessions
        .remove_other_sessions(current.user_id, current.session_token.as_deref())
        .await?;

    tracing::info!(
        user_id = %current.user_id,
        removed = outcome.removed,
        failed = outcome.failed,
        "Revoked other sessions"
    );

    Ok(Json(RevokeSessionsResponse {
        removed_count: outcome.removed,
        failed_count: outcome.failed,
    }))
}

pub async fn revoke_session(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id: SessionId = session_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid session ID".into()))?;

    let session = state
        .sessions
        .find_session(id)
        .await?
        .filter(|session| session.is_active_at(Utc::now()))
        .ok_or_else(|| AppError::NotFound("Session not found".into()))?;

    if session.user_id != current.user_id {
        return Err(AppError::Forbidden("Forbidden".into()));
    }

    state.sessions.remove_session_by_id(session.id).await?;
    tracing::info!(
        user_id = %current.user_id,
        session_id = %session.id,
        current = current.is_current_session(&session.session_token),
        "Session revoked"
    );

    Ok(Json(json!({
        "message": "Session revoked",
        "sessionId": session.id.to_string()
    })))
}

/// Sweeps expired sessions. Authorized by a shared secret, not a user session.
pub async fn cleanup_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CleanupSessionsResponse>, AppError> {
    let provided = headers
        .get(CLEANUP_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    let authorized = match (provided, state.config.session_cleanup_secret.as_deref()) {
        (Some(provided), Some(expected)) => secrets_match(provided, expected),
        _ => false,
    };
    if !authorized {
        return Err(AppError::Unauthorized("Unauthorized".into()));
    }

    let deleted_count = state.sessions.cleanup_expired_sessions().await?;
    Ok(Json(CleanupSessionsResponse { deleted_count }))
}
