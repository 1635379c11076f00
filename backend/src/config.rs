use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 1;
pub const MAX_JWT_EXPIRATION_HOURS: u64 = 24 * 30;
pub const DEFAULT_SESSION_TTL_HOURS: u64 = 24 * 7;
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStoreKind {
    Postgres,
    Memory,
}

impl std::str::FromStr for SessionStoreKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("Invalid SESSION_STORE value: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    pub session_ttl_hours: u64,
    pub session_sliding_expiration: bool,
    /// Shared secret for the sweep endpoint. `None` disables the endpoint.
    pub session_cleanup_secret: Option<String>,
    pub session_store: SessionStoreKind,
    pub cors_allow_origins: Vec<String>,
    pub cookie_secure: bool,
    pub server_port: u16,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/organizen".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        let jwt_expiration_hours = hours_or_default(
            env::var("JWT_EXPIRATION_HOURS").ok().as_deref(),
            DEFAULT_JWT_EXPIRATION_HOURS,
            MAX_JWT_EXPIRATION_HOURS,
        );
        let session_ttl_hours = hours_or_default(
            env::var("SESSION_TTL_HOURS").ok().as_deref(),
            DEFAULT_SESSION_TTL_HOURS,
            MAX_SESSION_TTL_HOURS,
        );
        let session_sliding_expiration = parse_env("SESSION_SLIDING_EXPIRATION", false);
        let cookie_secure = parse_env("COOKIE_SECURE", false);
        let server_port = parse_env("SERVER_PORT", 3000);

        let session_cleanup_secret = env::var("SESSION_CLEANUP_SECRET")
            .ok()
            .map(|secret| secret.trim().to_string())
            .filter(|secret| !secret.is_empty());

        let session_store = env::var("SESSION_STORE")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse::<SessionStoreKind>()?;

        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            session_ttl_hours,
            session_sliding_expiration,
            session_cleanup_secret,
            session_store,
            cors_allow_origins,
            cookie_secure,
            server_port,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses an hour count in `1..=max`. Anything else (missing, zero,
/// negative, garbage, too large) falls back to `default`.
fn hours_or_default(raw: Option<&str>, default: u64, max: u64) -> u64 {
    match raw.and_then(|value| value.trim().parse::<u64>().ok()) {
        Some(hours) if (1..=max).contains(&hours) => hours,
        Some(hours) => {
            tracing::warn!(hours, default, max, "Hour setting out of range, using default");
            default
        }
        None => default,
    }
}
