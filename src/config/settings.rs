//! Application settings and configuration structures.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use reqwest::Url;
use serde::Deserialize;

/// Root configuration structure containing all client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Remote API configuration
    pub api: ApiSettings,

    /// Session lifecycle timings
    pub session: SessionSettings,

    /// Persistent session storage
    #[serde(default)]
    pub storage: StorageSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Remote REST API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Base URL every request path is appended to
    pub base_url: String,

    /// Budget for ordinary requests in seconds
    pub request_timeout_secs: u64,

    /// Budget for document uploads in seconds
    pub upload_timeout_secs: u64,
}

/// Session lifecycle timings.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Expiry poll period in seconds.
    ///
    /// Bounds how long an expired token of an idle user can survive.
    pub expiry_check_interval_secs: u64,

    /// How long the refresh gate stays closed after an attempt
    pub refresh_cooldown_secs: u64,

    /// Delay between login and listener registration, so the login form's
    /// own clicks are not treated as activity
    pub listener_registration_delay_secs: u64,
}

/// Persistent storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// JSON file backing the session store; in-memory when unset
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if it fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.request_timeout_secs", 30)?
            .set_default("api.upload_timeout_secs", 60)?
            .set_default("session.expiry_check_interval_secs", 10)?
            .set_default("session.refresh_cooldown_secs", 30)?
            .set_default("session.listener_registration_delay_secs", 2)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__API__BASE_URL=... -> api.base_url
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.base_url", std::env::var("API_BASE_URL").ok())?
            .set_override_option("storage.path", std::env::var("SESSION_STORE_PATH").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| settings.validate())
    }

    /// Reject configurations the session lifecycle cannot run with.
    pub fn validate(self) -> Result<Self, ConfigError> {
        let url = Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::Message(format!("api.base_url is not a valid URL: {}", e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Message(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "api.request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.api.upload_timeout_secs < self.api.request_timeout_secs {
            return Err(ConfigError::Message(format!(
                "api.upload_timeout_secs ({}) must not be shorter than api.request_timeout_secs ({})",
                self.api.upload_timeout_secs, self.api.request_timeout_secs
            )));
        }

        if self.session.expiry_check_interval_secs == 0 {
            return Err(ConfigError::Message(
                "session.expiry_check_interval_secs must be greater than zero".into(),
            ));
        }
        if self.session.refresh_cooldown_secs == 0 {
            return Err(ConfigError::Message(
                "session.refresh_cooldown_secs must be greater than zero".into(),
            ));
        }

        Ok(self)
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            request_timeout_secs: 30,
            upload_timeout_secs: 60,
        }
    }
}

impl SessionSettings {
    pub fn expiry_check_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_check_interval_secs)
    }

    pub fn refresh_cooldown(&self) -> Duration {
        Duration::from_secs(self.refresh_cooldown_secs)
    }

    pub fn listener_registration_delay(&self) -> Duration {
        Duration::from_secs(self.listener_registration_delay_secs)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            expiry_check_interval_secs: 10,
            refresh_cooldown_secs: 30,
            listener_registration_delay_secs: 2,
        }
    }
}
