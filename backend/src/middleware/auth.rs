use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{
    state::AppState,
    types::UserId,
    utils::{
        cookies::{extract_cookie_value, ACCESS_COOKIE_NAME},
        jwt::{verify_access_token, Claims},
    },
};

/// Identity of an authenticated caller, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    /// Session token from the `sid` claim. `None` for tokens not bound to a
    /// session; those are never checked against the session store, so revoking
    /// sessions does not end them before their `exp`.
    pub session_token: Option<String>,
    pub claims: Claims,
}

impl CurrentUser {
    pub fn is_current_session(&self, session_token: &str) -> bool {
        self.session_token.as_deref() == Some(session_token)
    }
}

pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let current = authenticate_request(request.headers(), &state).await?;
    request.extensions_mut().insert(current);
    Ok(next.run(request).await)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(rest.trim()).filter(|token| !token.is_empty())
    } else {
        None
    }
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| extract_cookie_value(raw, ACCESS_COOKIE_NAME))
        })
}

async fn authenticate_request(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<CurrentUser, StatusCode> {
    let token = extract_token(headers).ok_or(StatusCode::UNAUTHORIZED)?;
    let claims = verify_access_token(&token, &state.config.jwt_secret)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let user_id: UserId = claims.sub.parse().map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Only tokens carrying a `sid` claim are tied to an active session. A token
    // without one is trusted on its signature and `exp` alone and cannot be
    // revoked through the session endpoints.
    if let Some(sid) = claims.sid.as_deref() {
        let session = state
            .sessions
            .validate_session(sid)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "Failed to validate session");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;
        if session.user_id != user_id {
            tracing::warn!(%user_id, session_id = %session.id, "Session owner mismatch");
            return Err(StatusCode::UNAUTHORIZED);
        }

        if let Err(err) = state.sessions.touch_session(sid).await {
            tracing::warn!(error = ?err, session_id = %session.id, "Failed to record session activity");
        }
    }

    Ok(CurrentUser {
        user_id,
        session_token: claims.sid.clone(),
        claims,
    })
}
