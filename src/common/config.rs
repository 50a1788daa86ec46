// src/common/config.rs
//! Process configuration
//!
//! Everything the services need from the environment is read once at startup
//! into an [`AppConfig`] and shared read-only afterwards. Business logic never
//! touches `std::env` directly.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_AUTH_PORT: u16 = 8081;
pub const DEFAULT_APP_PORT: u16 = 8080;
const DEFAULT_AWS_REGION: &str = "ap-northeast-1";
const DEFAULT_S3_BUCKET: &str = "s3-uploader-dev";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required in production")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Which half of the system this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    /// Auth and app routes behind a single listener
    Combined,
    Auth,
    App,
}

impl ServiceRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "combined" | "all" => Some(Self::Combined),
            "auth" | "auth-server" => Some(Self::Auth),
            "app" | "app-server" => Some(Self::App),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::Auth => "auth",
            Self::App => "app",
        }
    }

    pub fn serves_auth(self) -> bool {
        matches!(self, Self::Combined | Self::Auth)
    }

    pub fn serves_app(self) -> bool {
        matches!(self, Self::Combined | Self::App)
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub role: ServiceRole,
    pub listen_port: u16,
    pub auth_port: u16,
    pub app_port: u16,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub redirect_url: String,
    pub app_server_url: String,
    pub auth_server_url: String,
    pub aws_region: String,
    pub s3_bucket_name: String,
    /// Base64 AES-256 key; `None` means an ephemeral key is generated at startup
    pub session_secret: Option<String>,
    pub static_dir: PathBuf,
    pub upstream_timeout: Duration,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("role", &self.role)
            .field("listen_port", &self.listen_port)
            .field("google_client_id", &self.google_client_id)
            .field("google_client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .field("app_server_url", &self.app_server_url)
            .field("auth_server_url", &self.auth_server_url)
            .field("aws_region", &self.aws_region)
            .field("s3_bucket_name", &self.s3_bucket_name)
            .field("session_secret", &self.session_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment, honouring CLI role flags
    pub fn from_env() -> Result<Self, ConfigError> {
        let cli_role = parse_role_args(env::args());
        if let Some(role) = cli_role {
            info!(role = role.as_str(), "🔧 CLI override: SERVICE_ROLE");
        }

        Self::from_lookup(|key| {
            if key == "SERVICE_ROLE" {
                if let Some(role) = cli_role {
                    return Some(role.as_str().to_string());
                }
            }
            env::var(key).ok()
        })
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Outside production, missing values fall back to local development
    /// defaults with a warning. In production they are fatal.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let environment = match get("ENV").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };
        let production = environment == Environment::Production;

        let role = match get("SERVICE_ROLE") {
            Some(value) => ServiceRole::parse(&value).ok_or(ConfigError::Invalid {
                name: "SERVICE_ROLE",
                value,
            })?,
            None => ServiceRole::Combined,
        };

        let auth_port = parse_port(get("PORT_AUTH_SERVER"), "PORT_AUTH_SERVER", DEFAULT_AUTH_PORT)?;
        let app_port = parse_port(get("PORT_APP_SERVER"), "PORT_APP_SERVER", DEFAULT_APP_PORT)?;
        let role_port = match role {
            ServiceRole::Auth => auth_port,
            ServiceRole::Combined | ServiceRole::App => app_port,
        };
        // Hosting platforms inject PORT; it wins over the per-role port
        let listen_port = parse_port(get("PORT"), "PORT", role_port)?;

        let required = |key: &'static str, fallback: String| -> Result<String, ConfigError> {
            match get(key) {
                Some(value) => Ok(value),
                None if production => Err(ConfigError::Missing(key)),
                None => {
                    warn!(variable = key, "⚠️  {} not set, using development default", key);
                    Ok(fallback)
                }
            }
        };

        let google_client_id = required("GOOGLE_CLIENT_ID", "your-google-client-id".to_string())?;
        let google_client_secret =
            required("GOOGLE_CLIENT_SECRET", "your-google-client-secret".to_string())?;

        let app_server_url = trim_url(required(
            "APP_SERVER_URL",
            format!("http://localhost:{}", if role == ServiceRole::Combined { listen_port } else { app_port }),
        )?);
        let auth_server_url = trim_url(required(
            "AUTH_SERVER_URL",
            match role {
                ServiceRole::Combined => app_server_url.clone(),
                ServiceRole::Auth => format!("http://localhost:{}", listen_port),
                ServiceRole::App => format!("http://localhost:{}", auth_port),
            },
        )?);
        let redirect_url = required("REDIRECT_URL", format!("{}/auth/callback", auth_server_url))?;

        let aws_region = get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string());
        let s3_bucket_name = required("S3_BUCKET_NAME", DEFAULT_S3_BUCKET.to_string())?;

        let session_secret = get("SESSION_SECRET");
        if session_secret.is_none() && production {
            return Err(ConfigError::Missing("SESSION_SECRET"));
        }

        let static_dir = PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()));

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "UPSTREAM_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        };

        Ok(Self {
            environment,
            role,
            listen_port,
            auth_port,
            app_port,
            google_client_id,
            google_client_secret,
            redirect_url,
            app_server_url,
            auth_server_url,
            aws_region,
            s3_bucket_name,
            session_secret,
            static_dir,
            upstream_timeout,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Cookies are only marked `Secure` in production, where TLS terminates in front of us
    pub fn secure_cookies(&self) -> bool {
        self.is_production()
    }

    /// Where the app side sends anonymous visitors
    pub fn login_url(&self) -> String {
        if self.auth_server_url == self.app_server_url {
            "/login".to_string()
        } else {
            format!("{}/login", self.auth_server_url)
        }
    }

    /// Where a freshly minted session lands
    pub fn home_url(&self) -> &str {
        &self.app_server_url
    }

    /// Log the loaded configuration, excluding secrets
    pub fn log_summary(&self) {
        info!(
            env = ?self.environment,
            role = self.role.as_str(),
            listen_port = self.listen_port,
            aws_region = %self.aws_region,
            s3_bucket = %self.s3_bucket_name,
            redirect_url = %self.redirect_url,
            app_server_url = %self.app_server_url,
            auth_server_url = %self.auth_server_url,
            upstream_timeout_secs = self.upstream_timeout.as_secs(),
            "Loaded configuration"
        );
    }
}

/// CLI flags that pick the service role, e.g. `--auth` or `--app`
pub fn parse_role_args<I>(args: I) -> Option<ServiceRole>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter().find_map(|arg| match arg.as_str() {
        "--auth" | "--auth-only" => Some(ServiceRole::Auth),
        "--app" | "--app-only" => Some(ServiceRole::App),
        "--combined" => Some(ServiceRole::Combined),
        _ => None,
    })
}

fn parse_port(value: Option<String>, name: &'static str, default: u16) -> Result<u16, ConfigError> {
    match value {
        Some(v) => v.parse::<u16>().map_err(|_| ConfigError::Invalid { name, value: v }),
        None => Ok(default),
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Development configuration used across unit tests
#[cfg(test)]
pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "GOOGLE_CLIENT_ID" => Some("test-client-id.apps.googleusercontent.com".to_string()),
        "GOOGLE_CLIENT_SECRET" => Some("test-client-secret".to_string()),
        "S3_BUCKET_NAME" => Some("test-bucket".to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}
