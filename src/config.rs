//! Configuration for the mdr server.
//!
//! [`AppConfig`] is loaded from TOML. Every section uses `#[serde(default)]`
//! so a partial file (or no file at all) yields a runnable server.

use crate::error::{Result, ServerError};
use mdr_search::{SearchConfig, SearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `search.google_api_key`.
pub const GOOGLE_API_KEY_ENV: &str = "MDR_GOOGLE_API_KEY";
/// Environment variable overriding `search.google_engine_id`.
pub const GOOGLE_ENGINE_ID_ENV: &str = "MDR_GOOGLE_ENGINE_ID";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Search upstreams and budgets.
    pub search: SearchSettings,
    /// Session credential settings.
    pub session: SessionConfig,
    /// Feedback intake settings.
    pub feedback: FeedbackConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port (0 = auto-assign).
    pub port: u16,
    /// Origins allowed to make credentialed cross-origin requests.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            cors_allowed_origins: vec!["http://localhost:5173".to_owned()],
        }
    }
}

/// Search settings as they appear in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Per-attempt upstream timeout in seconds.
    pub timeout_seconds: u64,
    /// Optional deadline in seconds for a whole fallback chain.
    pub chain_deadline_seconds: Option<u64>,
    /// Fixed User-Agent. Rotates through browser agents when unset.
    pub user_agent: Option<String>,
    /// DuckDuckGo HTML endpoint.
    pub duckduckgo_url: String,
    /// Site qualifier appended to DuckDuckGo queries.
    pub site_qualifier: String,
    /// cppreference scheme and host.
    pub cppreference_origin: String,
    /// Google Custom Search API endpoint.
    pub google_api_url: String,
    /// Google API key.
    pub google_api_key: Option<String>,
    /// Google programmable search engine id.
    pub google_engine_id: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        let defaults = SearchConfig::default();
        Self {
            timeout_seconds: defaults.timeout_seconds,
            chain_deadline_seconds: defaults.chain_deadline_seconds,
            user_agent: defaults.user_agent,
            duckduckgo_url: defaults.duckduckgo_url,
            site_qualifier: defaults.site_qualifier,
            cppreference_origin: defaults.cppreference_origin,
            google_api_url: defaults.google_api_url,
            google_api_key: defaults.google_api_key,
            google_engine_id: defaults.google_engine_id,
        }
    }
}

impl SearchSettings {
    /// Build the search library configuration. Fields not exposed in the
    /// file keep their library defaults.
    pub fn to_search_config(&self) -> SearchConfig {
        SearchConfig {
            timeout_seconds: self.timeout_seconds,
            chain_deadline_seconds: self.chain_deadline_seconds,
            user_agent: self.user_agent.clone(),
            duckduckgo_url: self.duckduckgo_url.clone(),
            site_qualifier: self.site_qualifier.clone(),
            cppreference_origin: self.cppreference_origin.clone(),
            google_api_url: self.google_api_url.clone(),
            google_api_key: self.google_api_key.clone(),
            google_engine_id: self.google_engine_id.clone(),
            ..SearchConfig::default()
        }
    }
}

/// Session credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Signing secret. An empty secret is replaced by a random one at
    /// startup, which invalidates sessions across restarts.
    pub secret: String,
    /// Lifetime of an ordinary session.
    pub ttl_seconds: u64,
    /// Lifetime of a "remember me" session.
    pub remember_ttl_seconds: u64,
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_seconds: 6 * 60 * 60,
            remember_ttl_seconds: 30 * 24 * 60 * 60,
            cookie_name: "token".to_owned(),
        }
    }
}

/// Feedback intake configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Address feedback is addressed to.
    pub recipient: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Load from `path` if it exists, otherwise use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/mdr/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("mdr").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("mdr")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/mdr-config/config.toml")
        }
    }

    /// Apply Google credential overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply Google credential overrides from `lookup`. Blank values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_blank(GOOGLE_API_KEY_ENV) {
            self.search.google_api_key = Some(key);
        }
        if let Some(cx) = non_blank(GOOGLE_ENGINE_ID_ENV) {
            self.search.google_engine_id = Some(cx);
        }
    }

    /// Fill in a random session secret if none is configured.
    ///
    /// Returns `true` when a secret was generated.
    pub fn ensure_session_secret(&mut self) -> bool {
        if !self.session.secret.trim().is_empty() {
            return false;
        }
        self.session.secret = format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        );
        true
    }

    /// Check the configuration for values the server cannot run with.
    ///
    /// A blank session secret is rejected; call
    /// [`ensure_session_secret`](Self::ensure_session_secret) first to accept
    /// an ephemeral one.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ServerError::Config("server.host must not be empty".into()));
        }
        for origin in &self.server.cors_allowed_origins {
            if origin.trim() == "*" {
                return Err(ServerError::Config(
                    "wildcard CORS origin cannot be combined with credentials".into(),
                ));
            }
            if axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(ServerError::Config(format!(
                    "invalid CORS origin: {origin:?}"
                )));
            }
        }
        if self.session.ttl_seconds == 0 || self.session.remember_ttl_seconds == 0 {
            return Err(ServerError::Config(
                "session lifetimes must be greater than 0".into(),
            ));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(ServerError::Config(
                "session.cookie_name must not be empty".into(),
            ));
        }
        self.search
            .to_search_config()
            .validate()
            .map_err(|e| match e {
                SearchError::Config(msg) => ServerError::Config(format!("search: {msg}")),
                other => ServerError::Search(other),
            })?;
        if self.session.secret.trim().is_empty() {
            return Err(ServerError::Config(
                "session.secret must be set (see ensure_session_secret)".into(),
            ));
        }
        Ok(())
    }
}
