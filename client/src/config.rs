//! Client configuration loaded via OrthoConfig.
//!
//! Timeouts carry OrthoConfig defaults; the remaining values are optional and
//! their accessors apply the documented defaults. URLs are validated once, when [`ClientSettings::endpoints`] builds the value the
//! HTTP adapter consumes.

use std::{path::PathBuf, time::Duration};

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::ports::CREDENTIAL_STORAGE_KEY;

/// API base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/api";
/// Health-check URL used when none is configured.
pub const DEFAULT_HEALTH_URL: &str = "http://localhost:5001/health";
/// Per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Search debounce window in milliseconds.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
/// Credential directory, relative to the working directory.
pub const DEFAULT_TOKEN_DIR: &str = ".hospital-client";

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A URL setting does not parse or is not http(s).
    #[error("{name} is not a usable URL ({value:?}): {message}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        message: String,
    },
    /// The token directory is not valid UTF-8.
    #[error("token directory must be valid UTF-8: {path}")]
    NonUtf8Path { path: String },
}

/// Configuration values for the hospital client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HOSPITAL_CLIENT")]
pub struct ClientSettings {
    /// Base URL every API path is appended to.
    pub api_base_url: Option<String>,
    /// Unauthenticated health-check URL.
    pub health_url: Option<String>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Search debounce window in milliseconds.
    #[ortho_config(default = 300)]
    pub search_debounce_ms: u64,
    /// Directory holding the persisted credential.
    pub token_dir: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            health_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            token_dir: None,
        }
    }
}

impl ClientSettings {
    /// Return the configured API base URL, falling back to the default.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Return the configured health URL, falling back to the default.
    pub fn health_url(&self) -> &str {
        self.health_url.as_deref().unwrap_or(DEFAULT_HEALTH_URL)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Trailing-edge debounce window for search input.
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Directory of the credential file.
    pub fn token_dir(&self) -> Result<Utf8PathBuf, SettingsError> {
        let path = self
            .token_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_DIR));
        Utf8PathBuf::from_path_buf(path).map_err(|path| SettingsError::NonUtf8Path {
            path: path.to_string_lossy().into_owned(),
        })
    }

    /// Full path of the credential file, for diagnostics.
    pub fn token_path(&self) -> Result<Utf8PathBuf, SettingsError> {
        Ok(self.token_dir()?.join(CREDENTIAL_STORAGE_KEY))
    }

    /// Validated endpoints for the HTTP adapter.
    pub fn endpoints(&self) -> Result<ApiEndpoints, SettingsError> {
        ApiEndpoints::new(
            parse_url("api_base_url", self.api_base_url())?,
            parse_url("health_url", self.health_url())?,
            self.request_timeout(),
        )
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, SettingsError> {
    Url::parse(value).map_err(|err| SettingsError::InvalidUrl {
        name,
        value: value.to_owned(),
        message: err.to_string(),
    })
}

/// Where the hospital API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base_url: Url,
    health_url: Url,
    timeout: Duration,
}

impl ApiEndpoints {
    /// Validate that the base URL can have paths appended.
    pub fn new(base_url: Url, health_url: Url, timeout: Duration) -> Result<Self, SettingsError> {
        for (name, url) in [("api_base_url", &base_url), ("health_url", &health_url)] {
            if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
                return Err(SettingsError::InvalidUrl {
                    name,
                    value: url.to_string(),
                    message: "expected an http(s) URL".to_owned(),
                });
            }
        }
        Ok(Self {
            base_url,
            health_url,
            timeout,
        })
    }

    /// Base URL every API path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Unauthenticated health-check URL.
    pub fn health_url(&self) -> &Url {
        &self.health_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
