// src/services/testing.rs
//! In-memory stand-ins for the identity provider and object store

use async_trait::async_trait;
use axum::{http::header::SET_COOKIE, response::Response};
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::aws::{object_url, ObjectStore, StorageError};
use super::encryption::SessionCipher;
use super::google::{IdTokenClaims, IdentityProvider, ProviderError, TokenResponse};
use crate::auth::session::{SessionCodec, SESSION_COOKIE};
use crate::auth::User;
use crate::common::config::test_config;
use crate::common::AppState;

pub const FAKE_CODE: &str = "good-code";
pub const FAKE_ID_TOKEN: &str = "header.payload.signature";

/// Accepts exactly [`FAKE_CODE`] and [`FAKE_ID_TOKEN`]
pub struct FakeProvider {
    pub claims: IdTokenClaims,
    pub omit_id_token: bool,
    pub fail_verification: bool,
    pub exchange_delay: Option<Duration>,
    exchanges: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            claims: IdTokenClaims {
                sub: "google-sub-42".to_string(),
                email: "ada@example.com".to_string(),
                name: "Ada Lovelace".to_string(),
                picture: "https://example.com/ada.png".to_string(),
                email_verified: true,
            },
            omit_id_token: false,
            fail_verification: false,
            exchange_delay: None,
            exchanges: AtomicUsize::new(0),
        }
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> String {
        format!("https://idp.test/authorize?state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ProviderError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.exchange_delay {
            tokio::time::sleep(delay).await;
        }

        if code != FAKE_CODE {
            return Err(ProviderError::Rejected {
                status: 400,
                body: r#"{"error":"invalid_grant"}"#.to_string(),
            });
        }

        Ok(TokenResponse {
            access_token: "access".to_string(),
            id_token: (!self.omit_id_token).then(|| FAKE_ID_TOKEN.to_string()),
            refresh_token: None,
            expires_in: 3600,
            token_type: "Bearer".to_string(),
            scope: Some("openid profile email".to_string()),
        })
    }

    async fn verify_id_token(&self, raw_token: &str) -> Result<IdTokenClaims, ProviderError> {
        if self.fail_verification || raw_token != FAKE_ID_TOKEN {
            return Err(ProviderError::InvalidToken("signature mismatch".to_string()));
        }
        Ok(self.claims.clone())
    }
}

/// Keeps objects in a map keyed by storage key
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fail_writes: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::S3Error("Upload failed: simulated outage".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        object_url("test-bucket", "ap-northeast-1", key)
    }

    fn bucket(&self) -> &str {
        "test-bucket"
    }
}

/// Application state wired to the in-memory doubles
pub fn test_state(provider: Arc<FakeProvider>, store: Arc<MemoryStore>) -> Arc<AppState> {
    Arc::new(AppState {
        config: test_config(),
        sessions: Arc::new(SessionCodec::new(SessionCipher::ephemeral())),
        identity: provider,
        storage: store,
    })
}

pub fn sample_user() -> User {
    User {
        id: "google-sub-42".to_string(),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        picture: "https://example.com/ada.png".to_string(),
        provider: "google".to_string(),
        created: Utc::now(),
    }
}

/// `Cookie` header value carrying a valid session for `user`
pub fn session_header(state: &AppState, user: &User) -> String {
    let sealed = state.sessions.encode(user).unwrap();
    format!("{}={}", SESSION_COOKIE, sealed)
}

/// Every `Set-Cookie` header on a response
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Decoded value of the `Set-Cookie` header for `name`, if one was sent
pub fn set_cookie_value(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response).into_iter().find_map(|c| {
        let raw = c.strip_prefix(&prefix)?.split(';').next()?.to_string();
        let value = urlencoding::decode(&raw).ok()?.into_owned();
        (!value.is_empty()).then_some(value)
    })
}
