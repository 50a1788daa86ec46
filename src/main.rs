// src/main.rs
use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use dotenv::dotenv;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod logging_middleware;
mod services;
mod templates;
mod uploads;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::session::SessionCodec;
use common::{AppConfig, AppState};
use services::{GoogleProvider, IdentityProvider, ObjectStore, S3Store, SessionCipher};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env()?;
    config.log_summary();

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let cipher = match config.session_secret.as_deref() {
        Some(key) => SessionCipher::from_key(key)?,
        None => {
            warn!("⚠️  SESSION_SECRET not set, sessions will not survive a restart");
            warn!("   Generate one with: cargo run --bin generate_session_key");
            SessionCipher::ephemeral()
        }
    };

    let identity: Arc<dyn IdentityProvider> = Arc::new(GoogleProvider::new(&config));
    info!("GoogleProvider initialized");

    let storage: Arc<dyn ObjectStore> =
        Arc::new(S3Store::new(&config.aws_region, &config.s3_bucket_name).await?);

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let port = config.listen_port;
    let app_state = Arc::new(AppState {
        config,
        sessions: Arc::new(SessionCodec::new(cipher)),
        identity,
        storage,
    });

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let app = build_app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

/// Compose the routes for the configured role around shared middleware
pub fn build_app(state: Arc<AppState>) -> Router {
    let role = state.config.role;

    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest_service("/static", ServeDir::new(&state.config.static_dir));

    if role.serves_auth() {
        app = app.merge(auth::auth_routes());
    }

    if role.serves_app() {
        app = app.merge(uploads::uploads_routes());
    } else {
        app = app.route("/", get(auth::handlers::redirect_to_login));
    }

    let origins: Vec<HeaderValue> = [&state.config.app_server_url, &state.config.auth_server_url]
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    app
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_requests))
        .layer(Extension(state))
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http())
}
