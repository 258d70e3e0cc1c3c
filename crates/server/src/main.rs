mod config;
mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use config::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env();
    match &config.backend_url {
        Some(url) => tracing::info!("Proxying analysis requests to {url}"),
        None => tracing::warn!("ANALYSIS_BACKEND_URL not set, /api/v1/analyze will return 503"),
    }

    let state = match AppState::new(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };
    let bind_addr = state.config.bind_addr.clone();
    tracing::info!("Serving viewer from {}", state.config.viewer_dir.display());

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {bind_addr}: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {bind_addr}");
    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("circle-server/", env!("CARGO_PKG_VERSION")))
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}

/// API routes plus the viewer bundle; unknown paths get `index.html`.
pub fn app(state: AppState) -> Router {
    let viewer_dir = state.config.viewer_dir.clone();
    let index = viewer_dir.join("index.html");

    Router::new()
        .merge(routes::router())
        .fallback_service(ServeDir::new(viewer_dir).fallback(ServeFile::new(index)))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
