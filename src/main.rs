use std::sync::Arc;
use std::time::Duration;

use streamseek::{api::AppState, config::Config, routes::create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("streamseek=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Initialize application state
    let state = Arc::new(AppState::from_config(&config)?);

    // Periodically drop sessions whose clients went away without closing them
    let sweeper = state.clone();
    let sweep_period = config.session_idle_ttl().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_period);
        loop {
            ticker.tick().await;
            sweeper.sessions.evict_idle().await;
        }
    });

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
