#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::handlers::sessions::{CleanupSessionsResponse, RevokeSessionsResponse, SessionResponse};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        list_sessions_doc,
        revoke_other_sessions_doc,
        revoke_session_doc,
        cleanup_sessions_doc,
        logout_doc
    ),
    components(schemas(SessionResponse, RevokeSessionsResponse, CleanupSessionsResponse)),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Sessions", description = "Active session listing and revocation"),
        (name = "Auth", description = "Logout")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions",
    responses(
        (status = 200, description = "Caller's active sessions, most recent first", body = [SessionResponse]),
        (status = 401, description = "Not authenticated")
    ),
    tag = "Sessions"
)]
fn list_sessions_doc() {}

#[utoipa::path(
    delete,
    path = "/api/sessions",
    responses(
        (status = 200, description = "Every other session revoked", body = RevokeSessionsResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "Sessions"
)]
fn revoke_other_sessions_doc() {}

#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, body = serde_json::Value),
        (status = 400, description = "Malformed session ID"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Session belongs to another user"),
        (status = 404, description = "Session not found")
    ),
    tag = "Sessions"
)]
fn revoke_session_doc() {}

#[utoipa::path(
    post,
    path = "/api/sessions/cleanup",
    params(("x-cleanup-secret" = String, Header, description = "Shared cleanup secret")),
    responses(
        (status = 200, description = "Expired sessions swept", body = CleanupSessionsResponse),
        (status = 401, description = "Missing or wrong secret")
    ),
    tag = "Sessions",
    security(())
)]
fn cleanup_sessions_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, body = serde_json::Value),
        (status = 401, description = "Not authenticated")
    ),
    tag = "Auth"
)]
fn logout_doc() {}
