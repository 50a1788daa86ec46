// src/services/google.rs
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::common::AppConfig;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const JWKS_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/certs";
const ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Google rotates keys roughly daily and publishes them well ahead of use
const JWKS_TTL: Duration = Duration::from_secs(3600);
const JWKS_CACHE_KEY: &str = "google";

/// Scopes requested at login: basic identity only
pub const OAUTH_SCOPES: [&str; 3] = ["openid", "profile", "email"];

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Provider rejected the request: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("No signing key matches kid {0:?}")]
    UnknownSigningKey(Option<String>),

    #[error("Invalid id token: {0}")]
    InvalidToken(String),
}

/// Token endpoint response for the authorization-code grant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: String,
    pub scope: Option<String>,
}

/// The identity claims we read out of a verified ID token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub email_verified: bool,
}

/// OpenID-Connect identity provider capability.
///
/// The login flow only talks to this trait; tests swap in an in-memory
/// implementation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider tag stored on the user record, e.g. `"google"`
    fn name(&self) -> &'static str;

    /// Authorization endpoint URL carrying `state`
    fn authorization_url(&self, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ProviderError>;

    async fn verify_id_token(&self, raw_token: &str) -> Result<IdTokenClaims, ProviderError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kid: String,
    pub n: String,
    pub e: String,
}

impl JwkSet {
    fn find(&self, kid: Option<&str>) -> Option<&Jwk> {
        self.keys.iter().find(|k| Some(k.kid.as_str()) == kid)
    }
}

/// Where the provider's public signing keys come from
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, ProviderError>;
}

/// Google's published JWKS document
pub struct HttpKeySource {
    client: Client,
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<JwkSet, ProviderError> {
        let response = self
            .client
            .get(JWKS_ENDPOINT)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Fetching Google signing keys failed");
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let jwks = response
            .json::<JwkSet>()
            .await
            .map_err(|e| ProviderError::SerializationError(e.to_string()))?;

        info!(keys = jwks.keys.len(), "Fetched Google signing keys");
        Ok(jwks)
    }
}

/// Key set held for [`JWKS_TTL`]; a `kid` missing from the cached set
/// triggers one refetch before it is reported unknown.
#[derive(Clone)]
pub struct SigningKeys {
    source: Arc<dyn KeySource>,
    cache: Cache<String, Arc<JwkSet>>,
}

impl SigningKeys {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            cache: Cache::builder().time_to_live(JWKS_TTL).build(),
        }
    }

    pub async fn jwk_for(&self, kid: Option<&str>) -> Result<Jwk, ProviderError> {
        if let Some(cached) = self.cache.get(JWKS_CACHE_KEY).await {
            if let Some(jwk) = cached.find(kid) {
                return Ok(jwk.clone());
            }
            debug!(kid = ?kid, "Signing key not in cached set, refetching");
        }

        let fresh = Arc::new(self.source.fetch().await?);
        self.cache
            .insert(JWKS_CACHE_KEY.to_string(), fresh.clone())
            .await;

        fresh
            .find(kid)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownSigningKey(kid.map(str::to_string)))
    }
}

#[derive(Clone)]
pub struct GoogleProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    keys: SigningKeys,
}

impl GoogleProvider {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        let keys = SigningKeys::new(Arc::new(HttpKeySource {
            client: client.clone(),
        }));

        Self {
            client,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            keys,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline",
            AUTHORIZATION_ENDPOINT,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(&OAUTH_SCOPES.join(" ")),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ProviderError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %body, "Token exchange failed");
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ProviderError::SerializationError(e.to_string()))?;

        info!(
            has_id_token = token_response.id_token.is_some(),
            "Successfully exchanged authorization code for tokens"
        );
        Ok(token_response)
    }

    async fn verify_id_token(&self, raw_token: &str) -> Result<IdTokenClaims, ProviderError> {
        let header =
            decode_header(raw_token).map_err(|e| ProviderError::InvalidToken(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(ProviderError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let jwk = self.keys.jwk_for(header.kid.as_deref()).await?;
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| ProviderError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&ISSUERS);

        let data = decode::<IdTokenClaims>(raw_token, &key, &validation)
            .map_err(|e| ProviderError::InvalidToken(e.to_string()))?;

        if !data.claims.email_verified {
            debug!("Google token carries an unverified email address");
        }

        Ok(data.claims)
    }
}
