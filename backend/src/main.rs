use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use organizen_backend::{
    config::{Config, SessionStoreKind},
    db::connection::create_pool,
    repositories::{InMemorySessionStore, PgSessionStore, SessionStore},
    routes::app_router,
    services::SessionManager,
    state::AppState,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "organizen_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        jwt_secret = %mask_secret(&config.jwt_secret),
        jwt_expiration_hours = config.jwt_expiration_hours,
        session_ttl_hours = config.session_ttl_hours,
        session_sliding_expiration = config.session_sliding_expiration,
        session_cleanup_enabled = config.session_cleanup_secret.is_some(),
        session_store = ?config.session_store,
        "Loaded configuration from environment/.env"
    );

    let store: Arc<dyn SessionStore> = match config.session_store {
        SessionStoreKind::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            Arc::new(PgSessionStore::new(pool))
        }
        SessionStoreKind::Memory => {
            tracing::warn!("Using in-memory session store; sessions are lost on restart");
            Arc::new(InMemorySessionStore::new())
        }
    };

    let sessions = SessionManager::from_config(store, &config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let app = app_router(AppState::new(sessions, config));

    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
