use std::sync::Arc;
use storefront_sync::config::AppConfig;
use storefront_sync::error::StartupError;
use storefront_sync::router::create_app_router;
use storefront_sync::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);

    let addr = config.bind;

    // Initialize application state
    let state = Arc::new(AppState::from_config(config)?);

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    tracing::info!(%addr, "server running");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    axum::serve(listener, app)
        .await
        .map_err(StartupError::Serve)
}
