//! Authentication routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /login` - Login entry page
/// - `GET /auth/google` - Start Google OAuth
/// - `GET /auth/callback` - OAuth callback, mints the session
/// - `GET /logout` - Clear the session
pub fn auth_routes() -> Router {
    Router::new()
        .route("/login", get(handlers::login_page))
        .route("/auth/google", get(handlers::google_oauth_start))
        .route("/auth/callback", get(handlers::oauth_callback))
        .route("/logout", get(handlers::logout))
}
