//! # Taskboard API Server
//!
//! HTTP API and live-update WebSocket endpoint for the shared task
//! board. Provides:
//! - Authentication (register, login, password reset)
//! - Task CRUD with denormalized user projections
//! - User directory and avatar uploads
//! - WebSocket broadcast of every board mutation
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskboard-api
//! ```

use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
    mail::{Mailer, NoopMailer, ResendMailer},
    media::{HttpMediaStore, MediaStore, NoopMediaStore},
};
use taskboard_shared::db::{migrations::run_migrations, pool};
use taskboard_shared::realtime::heartbeat::spawn_heartbeat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&db).await?;

    let mailer: Arc<dyn Mailer> = match config.mail.clone() {
        Some(mail_config) => Arc::new(ResendMailer::new(mail_config)),
        None => {
            tracing::warn!("No mail configuration; reset links will be logged instead of sent");
            Arc::new(NoopMailer)
        }
    };

    let media: Arc<dyn MediaStore> = match config.media.clone() {
        Some(media_config) => Arc::new(HttpMediaStore::new(media_config)),
        None => {
            tracing::warn!("No media configuration; avatar uploads are disabled");
            Arc::new(NoopMediaStore)
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, mailer, media);

    spawn_heartbeat(state.registry.clone());

    let shutdown_db = state.db.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(shutdown_db).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves when a shutdown signal is received
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining...");
}
