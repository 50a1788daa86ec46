// Application state shared by every handler

use std::sync::Arc;

use crate::auth::session::SessionCodec;
use crate::common::config::AppConfig;
use crate::services::{IdentityProvider, ObjectStore};

/// Built once in `main` and handed to handlers through an `Extension`.
///
/// Nothing in here is mutated after startup, so no lock guards it.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: Arc<SessionCodec>,
    pub identity: Arc<dyn IdentityProvider>,
    pub storage: Arc<dyn ObjectStore>,
}
