pub mod config;
pub mod db;
pub mod errors;
pub mod http;
pub mod identity;
mod middleware;
pub mod models;
pub mod state;

use axum::{Router, middleware as axum_middleware};
use config::Config;
use errors::AppError;
use identity::IdentityResolver;
use middleware::{
    cors_layer, create_rate_limiter, rate_limit_middleware, spawn_rate_limiter_cleanup,
};
use state::AppState;
use std::{net::SocketAddr, time::Duration};
use tower_http::{services::ServeDir, trace::TraceLayer};

const RATE_LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// API routes plus static assets, wrapped in rate limiting, CORS and request tracing.
pub fn create_app(state: AppState, config: &Config) -> Router {
    let rate_limiter = create_rate_limiter(config.rate_limit_per_minute);
    if tokio::runtime::Handle::try_current().is_ok() {
        spawn_rate_limiter_cleanup(rate_limiter.clone(), RATE_LIMITER_CLEANUP_INTERVAL);
    }

    http::create_http_routes(state)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(axum_middleware::from_fn(move |req, next| {
            rate_limit_middleware(rate_limiter.clone(), req, next)
        }))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    // Nothing is routed until the store has answered.
    let store = db::connect(&config.storage).await?;
    let identity = IdentityResolver::new(config.identity_mode, config.trust_forwarded_for);
    let state = AppState::new(store, identity);

    let app = create_app(state, &config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!("Server running at http://localhost:{}", config.port);
    tracing::info!("Serving static files from {}", config.static_dir.display());
    tracing::info!("Vote identity mode: {:?}", config.identity_mode);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
