use axum::{
    extract::{Extension, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::AppError,
    middleware::auth::CurrentUser,
    state::AppState,
    utils::cookies::{build_clear_cookie, ACCESS_COOKIE_NAME, ACCESS_COOKIE_PATH},
};

/// Ends the caller's current session and clears the access cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    if let Some(token) = current.session_token.as_deref() {
        state.sessions.remove_session(token).await?;
        tracing::info!(user_id = %current.user_id, "Logged out");
    }

    let clear = build_clear_cookie(
        ACCESS_COOKIE_NAME,
        ACCESS_COOKIE_PATH,
        state.config.cookie_secure,
    );
    Ok((
        [(SET_COOKIE, clear)],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response())
}
