// Client configuration.
//
// File: `~/.bookmemory/config.toml`
// Environment: `BOOKMEMORY_API_URL` overrides `api_url`, `BOOKMEMORY_SESSION`
// carries the session cookie (never written to disk).

use std::path::{Path, PathBuf};

use bookmemory_common::types::{Sort, TagMode};
use serde::{Deserialize, Serialize};
use url::Url;

pub const API_URL_ENV: &str = "BOOKMEMORY_API_URL";
pub const SESSION_ENV: &str = "BOOKMEMORY_SESSION";

/// Name of the cookie the service issues at sign-in.
pub const SESSION_COOKIE_NAME: &str = "bookmemory_session";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Root directory for bookmemory client state: `~/.bookmemory/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".bookmemory"))
}

/// Path to the config file: `~/.bookmemory/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the bookmemory service.
    pub api_url: String,
    /// Page size for list requests.
    pub page_limit: u32,
    pub sort: Sort,
    pub tag_mode: TagMode,
    /// Session cookie value. Only ever read from the environment.
    #[serde(skip)]
    pub session: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            page_limit: DEFAULT_PAGE_LIMIT,
            sort: Sort::default(),
            tag_mode: TagMode::default(),
            session: None,
        }
    }
}

impl ClientConfig {
    /// Load from `~/.bookmemory/config.toml` and apply environment overrides.
    /// Falls back to defaults if the file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        config_path()
            .and_then(|p| Self::load_from(&p).ok())
            .unwrap_or_default()
            .with_overrides(|key| std::env::var(key).ok())
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(api_url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = api_url.trim().to_string();
        }
        if let Some(session) = lookup(SESSION_ENV).filter(|v| !v.trim().is_empty()) {
            self.session = Some(session.trim().to_string());
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_limit == 0 {
            return Err(ConfigError::Invalid("page_limit must be greater than zero"));
        }
        self.base_url().map(|_| ())
    }

    /// Parsed `api_url`. Only http(s) bases are accepted.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.api_url.trim()).map_err(ConfigError::Url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ConfigError::Invalid("api_url must use http or https")),
        }
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Url(url::ParseError),
    Invalid(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Url(e) => write!(f, "config api_url is invalid: {e}"),
            Self::Invalid(reason) => write!(f, "config is invalid: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
