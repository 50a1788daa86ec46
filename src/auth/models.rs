//! Authentication data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::google::IdTokenClaims;

/// Authenticated identity carried in the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider subject identifier
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: String,
    pub provider: String,
    pub created: DateTime<Utc>,
}

impl User {
    pub fn from_claims(claims: IdTokenClaims, provider: &str) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            picture: claims.picture,
            provider: provider.to_string(),
            created: Utc::now(),
        }
    }

    /// Name to greet the user with
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Query string the provider sends back to `/auth/callback`
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}
