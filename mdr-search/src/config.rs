//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] fixes the upstream endpoints, per-attempt budget,
//! per-resolver caps and the Google API credentials. Endpoint fields exist
//! so tests can point resolvers at a local mock server.

use crate::error::SearchError;
use std::time::Duration;
use url::Url;

/// Maximum `num` value accepted by the Google Custom Search API.
const GOOGLE_API_MAX_COUNT: usize = 10;

/// Configuration for the search aggregator and its resolvers.
///
/// Use [`Default::default()`] for the production endpoints, or construct
/// with field overrides.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Per-attempt HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Optional deadline in seconds for a whole fallback chain (primary plus
    /// secondary). `None` leaves each chain bounded only by its attempts.
    pub chain_deadline_seconds: Option<u64>,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// DuckDuckGo HTML search endpoint (form POST).
    pub duckduckgo_url: String,
    /// Site qualifier appended to DuckDuckGo queries.
    pub site_qualifier: String,
    /// Scheme and host of the cppreference site. Relative links are resolved
    /// against it.
    pub cppreference_origin: String,
    /// Path of the MediaWiki search script on the cppreference site.
    pub cppreference_search_path: String,
    /// Value of the `title` parameter selecting the wiki's search page.
    pub cppreference_search_title: String,
    /// Google Custom Search JSON API endpoint.
    pub google_api_url: String,
    /// Google API key. Without one the Google resolver fails fast.
    pub google_api_key: Option<String>,
    /// Google programmable search engine id (`cx`).
    pub google_engine_id: Option<String>,
    /// Qualifier appended to the Google query to scope its language.
    pub google_language_qualifier: String,
    /// `num` parameter sent to the Google API.
    pub google_request_count: usize,
    /// Maximum results kept from DuckDuckGo.
    pub duckduckgo_max_results: usize,
    /// Maximum results kept from the cppreference site search.
    pub cppreference_max_results: usize,
    /// Maximum results kept from the Google API. Non-binding in practice:
    /// the API itself returns at most `google_request_count` items.
    pub google_max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 5,
            chain_deadline_seconds: None,
            user_agent: None,
            duckduckgo_url: "https://duckduckgo.com/html/".into(),
            site_qualifier: "site:zh.cppreference.com".into(),
            cppreference_origin: "https://zh.cppreference.com".into(),
            cppreference_search_path: "/mwiki/index.php".into(),
            cppreference_search_title: "Special:搜索".into(),
            google_api_url: "https://www.googleapis.com/customsearch/v1".into(),
            google_api_key: None,
            google_engine_id: None,
            google_language_qualifier: "C语言".into(),
            google_request_count: 5,
            duckduckgo_max_results: 5,
            cppreference_max_results: 15,
            google_max_results: 15,
        }
    }
}

impl SearchConfig {
    /// The per-attempt budget as a [`Duration`].
    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// The optional whole-chain deadline as a [`Duration`].
    pub fn chain_deadline(&self) -> Option<Duration> {
        self.chain_deadline_seconds.map(Duration::from_secs)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` and `chain_deadline_seconds` must be greater than 0
    /// - every per-resolver cap must be greater than 0
    /// - `google_request_count` must be within `1..=10`
    /// - every endpoint must be an absolute URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.chain_deadline_seconds == Some(0) {
            return Err(SearchError::Config(
                "chain_deadline_seconds must be greater than 0".into(),
            ));
        }
        for (name, cap) in [
            ("duckduckgo_max_results", self.duckduckgo_max_results),
            ("cppreference_max_results", self.cppreference_max_results),
            ("google_max_results", self.google_max_results),
        ] {
            if cap == 0 {
                return Err(SearchError::Config(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        if self.google_request_count == 0 || self.google_request_count > GOOGLE_API_MAX_COUNT {
            return Err(SearchError::Config(format!(
                "google_request_count must be between 1 and {GOOGLE_API_MAX_COUNT}"
            )));
        }
        for (name, value) in [
            ("duckduckgo_url", &self.duckduckgo_url),
            ("cppreference_origin", &self.cppreference_origin),
            ("google_api_url", &self.google_api_url),
        ] {
            if Url::parse(value).is_err() {
                return Err(SearchError::Config(format!(
                    "{name} must be an absolute URL"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_reference_values() {
        let config = SearchConfig::default();
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.budget(), Duration::from_secs(5));
        assert!(config.chain_deadline().is_none());
        assert_eq!(config.duckduckgo_max_results, 5);
        assert_eq!(config.cppreference_max_results, 15);
        assert_eq!(config.google_max_results, 15);
        assert_eq!(config.google_request_count, 5);
        assert!(config.google_api_key.is_none());
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn zero_deadline_rejected() {
        let config = SearchConfig {
            chain_deadline_seconds: Some(0),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chain_deadline_seconds"));
    }

    #[test]
    fn zero_cap_rejected() {
        let config = SearchConfig {
            cppreference_max_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cppreference_max_results"));
    }

    #[test]
    fn google_request_count_bounded_by_api() {
        let config = SearchConfig {
            google_request_count: 11,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SearchConfig {
            google_request_count: 10,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn relative_endpoint_rejected() {
        let config = SearchConfig {
            google_api_url: "/customsearch/v1".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("google_api_url"));
    }

    #[test]
    fn deadline_converts_to_duration() {
        let config = SearchConfig {
            chain_deadline_seconds: Some(12),
            ..Default::default()
        };
        assert_eq!(config.chain_deadline(), Some(Duration::from_secs(12)));
    }
}
