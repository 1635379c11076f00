#![allow(dead_code)]
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use organizen_backend::{
    config::{Config, SessionStoreKind},
    models::active_session::{ActiveSession, NewActiveSession, SessionMetadata},
    repositories::{InMemorySessionStore, SessionStore},
    routes::app_router,
    services::SessionManager,
    state::AppState,
    types::{SessionId, UserId},
    utils::jwt::create_access_token,
};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_CLEANUP_SECRET: &str = "test-cleanup-secret";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/organizen_test".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiration_hours: 1,
        session_ttl_hours: 24,
        session_sliding_expiration: false,
        session_cleanup_secret: Some(TEST_CLEANUP_SECRET.to_string()),
        session_store: SessionStoreKind::Memory,
        cors_allow_origins: vec!["*".to_string()],
        cookie_secure: false,
        server_port: 0,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemorySessionStore>,
    pub manager: SessionManager,
    pub config: Config,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(InMemorySessionStore::new());
        let dyn_store: Arc<dyn SessionStore> = store.clone();
        let manager = SessionManager::from_config(dyn_store, &config);
        let router = app_router(AppState::new(manager.clone(), config.clone()));
        Self {
            router,
            store,
            manager,
            config,
        }
    }

    pub fn bearer(&self, user_id: UserId, session_token: Option<&str>) -> String {
        let token = create_access_token(
            user_id.to_string(),
            session_token.map(str::to_string),
            &self.config.jwt_secret,
            self.config.jwt_expiration_hours,
        )
        .expect("create access token");
        format!("Bearer {}", token)
    }

    pub async fn login(&self, user_id: UserId, device_label: &str) -> (ActiveSession, String) {
        let session = self
            .manager
            .create_session(
                user_id,
                SessionMetadata {
                    device_label: Some(device_label.to_string()),
                    ..SessionMetadata::default()
                },
            )
            .await
            .expect("create session");
        let bearer = self.bearer(user_id, Some(&session.session_token));
        (session, bearer)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }
}

pub fn authed_request(method: &str, uri: &str, bearer: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer)
        .body(Body::empty())
        .expect("build request")
}

pub fn anonymous_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn new_session(
    user_id: UserId,
    token: &str,
    expires_at: DateTime<Utc>,
) -> NewActiveSession {
    let created_at = Utc::now() - Duration::hours(2);
    NewActiveSession {
        id: SessionId::new(),
        session_token: token.to_string(),
        user_id,
        metadata: SessionMetadata::default(),
        created_at,
        expires_at,
    }
}

pub async fn seed_session(
    store: &dyn SessionStore,
    user_id: UserId,
    token: &str,
    expires_at: DateTime<Utc>,
) -> ActiveSession {
    store
        .insert(new_session(user_id, token, expires_at))
        .await
        .expect("seed session")
}
