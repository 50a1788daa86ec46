//! OAuth authorization-code login flow
//!
//! Pure sequencing over an [`IdentityProvider`]: the handlers own cookies and
//! redirects, this module owns the order of checks and the failure taxonomy.

use axum::http::StatusCode;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use std::time::Duration;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::models::{CallbackParams, User};
use crate::common::helpers::{safe_email_log, safe_token_log};
use crate::services::google::IdentityProvider;

const STATE_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("state parameter missing or does not match the state cookie")]
    InvalidState,

    #[error("identity provider returned an error: {0}")]
    ProviderError(String),

    #[error("callback carried no authorization code")]
    MissingCode,

    #[error("code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("token response carried no id_token")]
    MissingIdentityToken,

    #[error("id token verification failed: {0}")]
    TokenVerificationFailed(String),

    #[error("{0} timed out")]
    UpstreamTimeout(&'static str),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidState | AuthError::ProviderError(_) | AuthError::MissingCode => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidState => "INVALID_STATE",
            AuthError::ProviderError(_) => "PROVIDER_ERROR",
            AuthError::MissingCode => "MISSING_CODE",
            AuthError::ExchangeFailed(_) => "EXCHANGE_FAILED",
            AuthError::MissingIdentityToken => "MISSING_ID_TOKEN",
            AuthError::TokenVerificationFailed(_) => "TOKEN_VERIFICATION_FAILED",
            AuthError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidState => "Invalid state parameter",
            AuthError::ProviderError(_) => "Login was cancelled or denied",
            AuthError::MissingCode => "Authorization code not found",
            AuthError::ExchangeFailed(_) => "Failed to exchange token",
            AuthError::MissingIdentityToken => "Failed to complete sign-in",
            AuthError::TokenVerificationFailed(_) => "Failed to verify ID token",
            AuthError::UpstreamTimeout(_) => "The login provider did not respond in time",
        }
    }
}

/// Fresh unguessable login nonce, URL-safe
pub fn generate_state_token() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// True only when both values are present, non-empty and equal
pub fn verify_state(cookie: Option<&str>, query: Option<&str>) -> bool {
    match (cookie, query) {
        (Some(c), Some(q)) if !c.is_empty() => c.as_bytes().ct_eq(q.as_bytes()).into(),
        _ => false,
    }
}

pub struct OAuthFlow<'a> {
    provider: &'a dyn IdentityProvider,
    deadline: Duration,
}

impl<'a> OAuthFlow<'a> {
    pub fn new(provider: &'a dyn IdentityProvider, deadline: Duration) -> Self {
        Self { provider, deadline }
    }

    /// Mint a nonce and the provider URL that carries it
    pub fn initiate(&self) -> (String, String) {
        let state = generate_state_token();
        let url = self.provider.authorization_url(&state);
        debug!(state = %safe_token_log(&state), provider = self.provider.name(), "Starting OAuth login");
        (state, url)
    }

    /// Validate a callback and resolve it to a user.
    ///
    /// The state check runs first; nothing is sent to the provider for a
    /// callback whose state does not match.
    pub async fn complete(
        &self,
        state_cookie: Option<&str>,
        params: &CallbackParams,
    ) -> Result<User, AuthError> {
        if !verify_state(state_cookie, params.state.as_deref()) {
            warn!(
                has_cookie = state_cookie.is_some(),
                has_query = params.state.is_some(),
                "OAuth state mismatch"
            );
            return Err(AuthError::InvalidState);
        }

        if let Some(error) = &params.error {
            let detail = match &params.error_description {
                Some(desc) => format!("{}: {}", error, desc),
                None => error.clone(),
            };
            return Err(AuthError::ProviderError(detail));
        }

        let code = match params.code.as_deref() {
            Some(code) if !code.is_empty() => code,
            _ => return Err(AuthError::MissingCode),
        };

        let tokens = timeout(self.deadline, self.provider.exchange_code(code))
            .await
            .map_err(|_| AuthError::UpstreamTimeout("token exchange"))?
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        let id_token = tokens.id_token.ok_or(AuthError::MissingIdentityToken)?;

        let claims = timeout(self.deadline, self.provider.verify_id_token(&id_token))
            .await
            .map_err(|_| AuthError::UpstreamTimeout("id token verification"))?
            .map_err(|e| AuthError::TokenVerificationFailed(e.to_string()))?;

        let user = User::from_claims(claims, self.provider.name());
        info!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            "User authenticated"
        );
        Ok(user)
    }
}
