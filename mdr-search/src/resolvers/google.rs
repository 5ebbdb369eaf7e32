//! Google resolver: the Custom Search JSON API.
//!
//! Unlike the HTML resolvers this one talks to a structured API and needs
//! credentials. The API returns at most `num` items per call, so the
//! configured result cap is only a ceiling.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::resolver::{Resolver, ResolverOutcome};
use crate::sanitize::sanitize;
use crate::types::{SearchResult, SourceName};
use serde::Deserialize;
use std::time::Duration;

use super::origin_of;

/// Google Custom Search API resolver.
///
/// Primary resolver of the Google chain. Fails without touching the network
/// when no API key or engine id is configured, so the chain goes straight
/// to the mock generator.
#[derive(Clone)]
pub struct GoogleResolver {
    client: reqwest::Client,
    api_url: String,
    origin: String,
    api_key: Option<String>,
    engine_id: Option<String>,
    language_qualifier: String,
    request_count: usize,
    max_results: usize,
}

impl std::fmt::Debug for GoogleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleResolver")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("engine_id", &self.engine_id)
            .field("request_count", &self.request_count)
            .field("max_results", &self.max_results)
            .finish()
    }
}

/// Top-level Custom Search API response. `items` is absent when the search
/// has no hits.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    items: Vec<ApiItem>,
}

#[derive(Debug, Deserialize)]
struct ApiItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleResolver {
    /// Create a resolver using the shared `client` and the endpoint,
    /// credentials and caps from `config`.
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            api_url: config.google_api_url.clone(),
            origin: origin_of(&config.google_api_url),
            api_key: config.google_api_key.clone(),
            engine_id: config.google_engine_id.clone(),
            language_qualifier: config.google_language_qualifier.clone(),
            request_count: config.google_request_count,
            max_results: config.google_max_results,
        }
    }

    fn credentials(&self) -> Result<(&str, &str), SearchError> {
        let key = self.api_key.as_deref().filter(|k| !k.trim().is_empty());
        let cx = self.engine_id.as_deref().filter(|c| !c.trim().is_empty());
        match (key, cx) {
            (Some(key), Some(cx)) => Ok((key, cx)),
            _ => Err(SearchError::Config(
                "Google API key or engine id not configured".into(),
            )),
        }
    }

    fn qualified_query(&self, query: &str) -> String {
        if self.language_qualifier.is_empty() {
            query.to_owned()
        } else {
            format!("{query} {}", self.language_qualifier)
        }
    }
}

impl Resolver for GoogleResolver {
    async fn resolve(&self, query: &str, budget: Duration) -> ResolverOutcome {
        tracing::trace!(query, "Google API search");

        let (key, cx) = self.credentials()?;
        let qualified = self.qualified_query(query);
        let num = self.request_count.to_string();

        let request = self.client.get(&self.api_url).query(&[
            ("key", key),
            ("cx", cx),
            ("q", qualified.as_str()),
            ("num", num.as_str()),
        ]);

        let body = http::fetch_text(self.name(), request, budget).await?;
        parse_google_json(&body, &self.origin, self.max_results)
    }

    fn name(&self) -> &'static str {
        "Google"
    }

    fn source(&self) -> SourceName {
        SourceName::Google
    }

    fn max_results(&self) -> usize {
        self.max_results
    }
}

/// Parse a Custom Search API JSON body.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body is not the expected JSON
/// object, or if it yields no usable items. An empty answer is treated as a
/// failure so the chain substitutes the mock results.
pub(crate) fn parse_google_json(
    body: &str,
    origin: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid Google API response: {e}")))?;

    let results: Vec<SearchResult> = response
        .items
        .iter()
        .filter(|item| !item.title.trim().is_empty() && !item.link.trim().is_empty())
        .take(max_results)
        .map(|item| sanitize(&item.title, &item.snippet, &item.link, origin))
        .collect();

    if results.is_empty() {
        return Err(SearchError::Parse("Google API returned no items".into()));
    }

    tracing::debug!(count = results.len(), "Google results parsed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ORIGIN: &str = "https://www.googleapis.com";

    fn test_config(server: &MockServer) -> SearchConfig {
        SearchConfig {
            google_api_url: format!("{}/customsearch/v1", server.uri()),
            google_api_key: Some("test-key".into()),
            google_engine_id: Some("test-cx".into()),
            user_agent: Some("TestBot/1.0".into()),
            ..Default::default()
        }
    }

    fn item(i: usize) -> serde_json::Value {
        json!({
            "kind": "customsearch#result",
            "title": format!("printf result {i}"),
            "link": format!("https://example.com/printf/{i}"),
            "snippet": format!("Snippet {i}"),
        })
    }

    #[test]
    fn parse_maps_items() {
        let body = json!({ "items": [item(0), item(1)] }).to_string();
        let results = parse_google_json(&body, ORIGIN, 15).expect("should parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "printf result 0");
        assert_eq!(results[0].description, "Snippet 0");
        assert_eq!(results[0].link, "https://example.com/printf/0");
    }

    #[test]
    fn parse_caps_at_max_results() {
        let items: Vec<_> = (0..20).map(item).collect();
        let body = json!({ "items": items }).to_string();
        let results = parse_google_json(&body, ORIGIN, 15).expect("should parse");
        assert_eq!(results.len(), 15);
    }

    #[test]
    fn parse_missing_items_is_failure() {
        let body = json!({ "searchInformation": { "totalResults": "0" } }).to_string();
        let err = parse_google_json(&body, ORIGIN, 15).unwrap_err();
        assert!(err.to_string().contains("no items"));
    }

    #[test]
    fn parse_invalid_json_is_parse_error() {
        let err = parse_google_json("<html>not json</html>", ORIGIN, 15).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn parse_skips_items_without_link() {
        let body = json!({ "items": [{ "title": "no link" }, item(1)] }).to_string();
        let results = parse_google_json(&body, ORIGIN, 15).expect("should parse");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "printf result 1");
    }

    #[tokio::test]
    async fn resolve_sends_api_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("key", "test-key"))
            .and(query_param("cx", "test-cx"))
            .and(query_param("q", "printf C语言"))
            .and(query_param("num", "5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "items": (0..5).map(item).collect::<Vec<_>>() })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server);
        let client = http::build_client(&config).expect("client");
        let resolver = GoogleResolver::new(client, &config);

        let results = resolver
            .resolve("printf", Duration::from_secs(5))
            .await
            .expect("should succeed");
        assert_eq!(results.len(), 5);
    }

    #[tokio::test]
    async fn resolve_maps_401_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "code": 401, "message": "API key not valid" }
            })))
            .mount(&server)
            .await;

        let config = test_config(&server);
        let client = http::build_client(&config).expect("client");
        let resolver = GoogleResolver::new(client, &config);

        let err = resolver
            .resolve("printf", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::Status {
                upstream: "Google",
                code: 401
            }
        ));
    }

    #[tokio::test]
    async fn resolve_without_credentials_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = SearchConfig {
            google_api_key: None,
            ..test_config(&server)
        };
        let client = http::build_client(&config).expect("client");
        let resolver = GoogleResolver::new(client, &config);

        let err = resolver
            .resolve("printf", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = SearchConfig {
            google_api_key: Some("super-secret".into()),
            ..Default::default()
        };
        let client = http::build_client(&config).expect("client");
        let resolver = GoogleResolver::new(client, &config);
        let debug = format!("{resolver:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GoogleResolver>();
    }
}
