use std::ops::RangeInclusive;

use anyhow::Context;

/// Accepted `SESSION_TTL_MINUTES`: one minute up to one year.
pub const SESSION_TTL_RANGE: RangeInclusive<i64> = 1..=60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "APP_PORT", 8080)?;
        let ttl_minutes = parse_or(&lookup, "SESSION_TTL_MINUTES", 60 * 8)?;
        anyhow::ensure!(
            SESSION_TTL_RANGE.contains(&ttl_minutes),
            "SESSION_TTL_MINUTES must be within {}..={}, got {ttl_minutes}",
            SESSION_TTL_RANGE.start(),
            SESSION_TTL_RANGE.end()
        );
        let session = SessionConfig {
            ttl_minutes,
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", false)?,
        };
        Ok(Self {
            database_url,
            max_connections,
            host,
            port,
            session,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
