//! Shared HTTP client and request helpers for upstream resolvers.
//!
//! One [`reqwest::Client`] is built per aggregator and reused across
//! requests; it carries no request-specific state. The per-attempt budget
//! is applied to each request rather than to the client.

use crate::config::SearchConfig;
use crate::error::SearchError;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Desktop browser User-Agents common among zh-CN visitors, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0",
];

/// `Accept` header sent to the scraped HTML endpoints.
pub const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// `Accept-Language` header sent to the scraped HTML endpoints.
pub const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

const MAX_REDIRECTS: usize = 10;

/// Build the [`reqwest::Client`] shared by all resolvers.
///
/// Cookies persist across requests (DuckDuckGo sets them on the first
/// hit), responses may be brotli or gzip encoded, and redirects are capped.
/// No client-wide timeout is set.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the TLS backend cannot be initialised.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| random_user_agent().to_owned());

    reqwest::Client::builder()
        .cookie_store(true)
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| SearchError::Http(format!("client construction failed: {e}")))
}

/// Pick one entry of the built-in User-Agent list.
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Send `request` within `budget` and return the response body as text.
///
/// Transport failures, timeouts and non-2xx statuses are classified into
/// the matching [`SearchError`] variant, tagged with `upstream`.
pub async fn fetch_text(
    upstream: &'static str,
    request: reqwest::RequestBuilder,
    budget: Duration,
) -> Result<String, SearchError> {
    let response = request
        .timeout(budget)
        .send()
        .await
        .map_err(|e| SearchError::from_reqwest(upstream, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Status {
            upstream,
            code: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| SearchError::from_reqwest(upstream, e))?;

    tracing::trace!(upstream, bytes = body.len(), "upstream response received");
    Ok(body)
}
