//! Session cookie codec
//!
//! The whole session lives in the `user_session` cookie: the JSON user record,
//! sealed with [`SessionCipher`] and base64 encoded. Expiry is carried by the
//! cookie attributes, not the payload.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use thiserror::Error;
use tracing::debug;

use super::models::User;
use crate::services::encryption::{CipherError, SessionCipher};

pub const SESSION_COOKIE: &str = "user_session";
pub const STATE_COOKIE: &str = "oauth_state";

pub const SESSION_TTL_HOURS: i64 = 24;
pub const STATE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session payload could not be sealed or opened: {0}")]
    Cipher(#[from] CipherError),

    #[error("session payload is not a user record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct SessionCodec {
    cipher: SessionCipher,
}

impl SessionCodec {
    pub fn new(cipher: SessionCipher) -> Self {
        Self { cipher }
    }

    pub fn encode(&self, user: &User) -> Result<String, SessionError> {
        let json = serde_json::to_vec(user)?;
        Ok(self.cipher.seal(&json)?)
    }

    pub fn decode(&self, raw: &str) -> Result<User, SessionError> {
        let json = self.cipher.open(raw)?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// The signed-in user, if any.
    ///
    /// Undecodable, tampered or malformed cookies all read as anonymous.
    pub fn read(&self, jar: &CookieJar) -> Option<User> {
        let cookie = jar.get(SESSION_COOKIE)?;

        match self.decode(cookie.value()) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!(error = %e, "Ignoring unreadable session cookie");
                None
            }
        }
    }
}

/// `user_session` cookie for a freshly minted session
pub fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::hours(SESSION_TTL_HOURS))
        .build()
}

/// `oauth_state` cookie holding the login nonce.
///
/// SameSite=Lax so it survives the top-level redirect back from the provider.
pub fn state_cookie(nonce: String, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, nonce))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::minutes(STATE_TTL_MINUTES))
        .build()
}

/// Template for expiring `name`; path must match the one it was set with
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use chrono::Utc;

    fn codec() -> SessionCodec {
        SessionCodec::new(SessionCipher::ephemeral())
    }

    fn user() -> User {
        User {
            id: "108234".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            picture: "https://example.com/ada.png".to_string(),
            provider: "google".to_string(),
            created: Utc::now(),
        }
    }

    fn jar_with(cookie_header: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie_header).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn test_encode_decode() {
        let codec = codec();
        let user = user();

        let raw = codec.encode(&user).unwrap();
        assert_eq!(codec.decode(&raw).unwrap(), user);
    }

    #[test]
    fn test_read_valid_session() {
        let codec = codec();
        let raw = codec.encode(&user()).unwrap();

        let jar = jar_with(&format!("{}={}", SESSION_COOKIE, raw));
        assert_eq!(codec.read(&jar).map(|u| u.id), Some("108234".to_string()));
    }

    #[test]
    fn test_missing_cookie_is_anonymous() {
        assert!(codec().read(&CookieJar::new()).is_none());
        assert!(codec().read(&jar_with("other=value")).is_none());
    }

    #[test]
    fn test_non_base64_cookie_is_anonymous() {
        let jar = jar_with(&format!("{}=%%%not-base64%%%", SESSION_COOKIE));
        assert!(codec().read(&jar).is_none());
    }

    #[test]
    fn test_non_json_payload_is_anonymous() {
        let cipher = SessionCipher::from_key(&SessionCipher::generate_key()).unwrap();
        let sealed_garbage = cipher.seal(b"this is not json").unwrap();
        let codec = SessionCodec::new(cipher);

        assert!(matches!(codec.decode(&sealed_garbage), Err(SessionError::Json(_))));

        let jar = jar_with(&format!("{}={}", SESSION_COOKIE, sealed_garbage));
        assert!(codec.read(&jar).is_none());
    }

    #[test]
    fn test_auth_and_app_servers_share_generated_key() {
        let key = SessionCipher::generate_key();
        let auth_server = SessionCodec::new(SessionCipher::from_key(&key).unwrap());
        let app_server = SessionCodec::new(SessionCipher::from_key(&key).unwrap());
        let other_app = SessionCodec::new(SessionCipher::from_key(&SessionCipher::generate_key()).unwrap());

        let raw = auth_server.encode(&user()).unwrap();
        let jar = jar_with(&format!("{}={}", SESSION_COOKIE, raw));

        assert_eq!(app_server.read(&jar).map(|u| u.id), Some("108234".to_string()));
        assert!(other_app.read(&jar).is_none());
    }

    #[test]
    fn test_unsealed_json_is_anonymous() {
        let forged = BASE64.encode(serde_json::to_vec(&user()).unwrap());
        let jar = jar_with(&format!("{}={}", SESSION_COOKIE, forged));
        assert!(codec().read(&jar).is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("v".to_string(), false);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::hours(24)));

        let state = state_cookie("n".to_string(), true);
        assert_eq!(state.secure(), Some(true));
        assert_eq!(state.max_age(), Some(CookieDuration::minutes(10)));
    }
}
