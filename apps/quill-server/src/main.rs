use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{error, info};

use quill_api::{build_router, AppState};
use quill_core::{SessionManager, SessionPolicy};
use quill_infrastructure::{
    create_pool, run_migrations, PgRevocationRepository, PgSessionRepository, PgUserRepository,
};
use quill_security::{PasswordService, TokenCodec};
use quill_shared::config::AppConfig;
use quill_shared::{Clock, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    quill_shared::telemetry::init_telemetry(config.app.log_format);

    info!(env = %config.app.env, "{} starting...", config.app.name);

    // Connect to Database
    let pool = create_pool(&config.database)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to apply migrations")?;
    info!("Database connection established.");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let codec = Arc::new(TokenCodec::new(
        &config.jwt.secret,
        config.jwt.token_ttl(),
        clock.clone(),
    ));
    let passwords = Arc::new(
        PasswordService::from_settings(&config.password)
            .context("invalid password hashing parameters")?,
    );
    let manager = Arc::new(SessionManager::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgSessionRepository::new(pool.clone())),
        Arc::new(PgRevocationRepository::new(pool.clone())),
        codec,
        passwords,
        clock,
        SessionPolicy::from_config(&config),
    ));

    let sweeper = spawn_sweeper(
        manager.clone(),
        Duration::from_secs(config.session.sweep_interval_secs),
    );

    let app = build_router(AppState::new(manager));

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse().context("invalid app.host")?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    pool.close().await;
    info!("Server stopped");
    Ok(())
}

/// Periodically deletes expired sessions and revocations.
fn spawn_sweeper(manager: Arc<SessionManager>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = manager.sweep().await {
                error!("Session sweep failed: {}", e);
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
