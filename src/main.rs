use std::sync::Arc;

use cinefeed::{
    config::Config,
    db::{create_pool, PgStore},
    notifications::NotificationHub,
    routes::{create_router, AppState},
    services::providers::TmdbProvider,
    session::SessionKeys,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinefeed=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(pool));

    let provider = Arc::new(TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_image_url.clone(),
        config.tmdb_language.clone(),
    ));

    let state = Arc::new(AppState {
        catalog: store.clone(),
        films: store.clone(),
        reviews: store.clone(),
        groups: store,
        provider,
        notifications: NotificationHub::new(),
        sessions: SessionKeys::new(
            &config.jwt_secret,
            i64::try_from(config.session_ttl_hours)?,
        ),
    });

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
