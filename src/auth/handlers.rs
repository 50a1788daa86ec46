//! Authentication handlers

use axum::{
    extract::{Extension, Query},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{error, info};

use super::extractors::MaybeUser;
use super::flow::OAuthFlow;
use super::models::CallbackParams;
use super::session::{removal_cookie, session_cookie, state_cookie, SESSION_COOKIE, STATE_COOKIE};
use crate::common::{safe_email_log, ApiError, AppState};
use crate::templates;

/// GET /login
/// Renders the login entry page
pub async fn login_page(MaybeUser(user): MaybeUser) -> Html<String> {
    Html(templates::login_page(user.as_ref()))
}

/// GET /auth/google
/// Issues the `oauth_state` cookie and sends the browser to the provider
pub async fn google_oauth_start(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let flow = OAuthFlow::new(state.identity.as_ref(), state.config.upstream_timeout);
    let (nonce, auth_url) = flow.initiate();

    let jar = jar.add(state_cookie(nonce, state.config.secure_cookies()));
    (jar, Redirect::temporary(&auth_url))
}

/// GET /auth/callback
///
/// The state cookie is removed on every outcome so a nonce is never accepted
/// twice.
pub async fn oauth_callback(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Result<Redirect, ApiError>) {
    let nonce = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(removal_cookie(STATE_COOKIE));

    let flow = OAuthFlow::new(state.identity.as_ref(), state.config.upstream_timeout);
    let user = match flow.complete(nonce.as_deref(), &params).await {
        Ok(user) => user,
        Err(e) => return (jar, Err(e.into())),
    };

    let sealed = match state.sessions.encode(&user) {
        Ok(sealed) => sealed,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "Failed to seal session");
            return (jar, Err(ApiError::InternalServer("failed to seal session".into())));
        }
    };

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        home = %state.config.home_url(),
        "Session issued"
    );

    let jar = jar.add(session_cookie(sealed, state.config.secure_cookies()));
    (jar, Ok(Redirect::temporary(state.config.home_url())))
}

/// GET /logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    info!("User logged out");
    (jar.remove(removal_cookie(SESSION_COOKIE)), Redirect::temporary("/login"))
}

/// GET / when only the auth routes are mounted
pub async fn redirect_to_login() -> Redirect {
    Redirect::temporary("/login")
}
