//! Session extractors for Axum
//!
//! Three flavours over the same cookie read:
//! - [`MaybeUser`] never rejects
//! - [`PageUser`] sends anonymous browsers to the login page (307)
//! - [`AuthedUser`] rejects anonymous callers with 401

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};

use super::models::User;
use crate::common::{safe_email_log, ApiError, AppState};

async fn app_state<S>(parts: &mut Parts, state: &S) -> Result<Arc<AppState>, ApiError>
where
    S: Send + Sync,
{
    let Extension(app_state): Extension<Arc<AppState>> =
        Extension::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;
    Ok(app_state)
}

fn session_user(app_state: &AppState, parts: &Parts) -> Option<User> {
    let jar = CookieJar::from_headers(&parts.headers);
    let user = app_state.sessions.read(&jar);

    if let Some(u) = &user {
        debug!(user_id = %u.id, email = %safe_email_log(&u.email), "Session found");
    }
    user
}

/// The signed-in user, or `None` for anonymous callers
#[derive(Debug)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match app_state(parts, state).await {
            Ok(app_state) => Ok(MaybeUser(session_user(&app_state, parts))),
            Err(e) => {
                warn!(error = %e, "Session lookup skipped");
                Ok(MaybeUser(None))
            }
        }
    }
}

/// Rejection for page routes: a temporary redirect to the login page
#[derive(Debug)]
pub enum PageRejection {
    Login(String),
    Internal(ApiError),
}

impl IntoResponse for PageRejection {
    fn into_response(self) -> Response {
        match self {
            PageRejection::Login(url) => Redirect::temporary(&url).into_response(),
            PageRejection::Internal(e) => e.into_response(),
        }
    }
}

/// Signed-in user for HTML pages
#[derive(Debug)]
pub struct PageUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for PageUser
where
    S: Send + Sync,
{
    type Rejection = PageRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = app_state(parts, state)
            .await
            .map_err(PageRejection::Internal)?;

        match session_user(&app_state, parts) {
            Some(user) => Ok(PageUser(user)),
            None => {
                let login = app_state.config.login_url();
                debug!(path = %parts.uri.path(), login = %login, "No session, redirecting to login");
                Err(PageRejection::Login(login))
            }
        }
    }
}

/// Signed-in user for API-style endpoints
#[derive(Debug)]
pub struct AuthedUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = app_state(parts, state).await?;

        match session_user(&app_state, parts) {
            Some(user) => Ok(AuthedUser(user)),
            None => {
                warn!(path = %parts.uri.path(), "Authentication failed: no valid session");
                Err(ApiError::Unauthorized("no valid session".into()))
            }
        }
    }
}
