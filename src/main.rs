use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contest_picker::{api, auth, config::ServerConfig, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contest_picker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting contest picker...");

    let config = ServerConfig::from_env();
    let auth_config = Arc::new(auth::AuthConfig::from_env());
    let addr = config.listen_addr;

    let state = Arc::new(AppState::new(config));
    match state.store.ensure_initialized() {
        Ok(true) => {}
        Ok(false) => tracing::info!("Using history file {}", state.store.describe()),
        Err(e) => {
            tracing::error!(
                "Failed to initialize history file {}: {}",
                state.store.describe(),
                e
            );
            std::process::exit(1);
        }
    }

    let app = api::router(state, auth_config);

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
