use std::{sync::Arc, time::Duration};

mod app;
mod auth;
mod config;
mod db;
mod error;
mod state;
mod views;

use crate::{
    auth::{repo::PgUserStore, session::MemorySessionStore},
    config::AppConfig,
    state::AppState,
};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "smartid=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);

    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let sessions = Arc::new(MemorySessionStore::new(time::Duration::minutes(
        config.session.ttl_minutes,
    )));
    tokio::spawn({
        let sessions = sessions.clone();
        async move {
            let mut tick = tokio::time::interval(SESSION_PURGE_INTERVAL);
            loop {
                tick.tick().await;
                let purged = sessions.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "expired sessions purged");
                }
            }
        }
    });

    let state = AppState::from_parts(Arc::new(PgUserStore::new(pool)), sessions, config.clone());

    app::serve(app::build_app(state), &config).await
}
