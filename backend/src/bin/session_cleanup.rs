use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use organizen_backend::{
    config::Config, db::connection::create_pool, repositories::PgSessionStore,
    services::SessionManager,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "organizen_backend=info,session_cleanup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let manager = SessionManager::from_config(Arc::new(PgSessionStore::new(pool.clone())), &config);
    let deleted = manager.cleanup_expired_sessions().await?;
    tracing::info!(deleted, "Expired session sweep finished");

    sqlx::query("VACUUM (ANALYZE) active_sessions")
        .execute(&pool)
        .await?;

    Ok(())
}
