//! # mdr-search
//!
//! Concurrent multi-source search aggregation for mdr.
//!
//! A query fans out to several independent upstreams at once, their
//! differing response shapes are normalised into one result type, and any
//! slow, unreachable or malformed source degrades to an empty (or mock)
//! result set instead of failing the request.
//!
//! ## Design
//!
//! - Two fallback chains run concurrently:
//!   DuckDuckGo (site-scoped to cppreference) → cppreference site search,
//!   and Google Custom Search API → deterministic mock generator
//! - Every upstream attempt carries its own timeout
//! - HTML upstreams are parsed with CSS selectors, the API with serde
//! - Titles and descriptions are trimmed and bounded; links made absolute
//! - The response keeps one ordered sequence per source; no cross-source
//!   ranking or deduplication
//!
//! ## Security
//!
//! - No network listeners; the HTTP surface lives in the `mdr` crate
//! - Search queries are logged only at trace level
//! - The Google API key never appears in errors or `Debug` output

pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod resolver;
pub mod resolvers;
pub mod sanitize;
pub mod types;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use orchestrator::{Aggregator, FallbackChain};
pub use resolver::{Resolver, ResolverOutcome};
pub use types::{AggregatedResponse, SearchResult, SourceName};

/// Search every configured source for `query` using `config`.
///
/// Builds a one-off [`Aggregator`]. Long-lived callers should build one
/// aggregator and reuse it so the HTTP connection pool is shared.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid configuration and
/// [`SearchError::EmptyQuery`] for an empty query. Upstream failures never
/// surface as errors.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> mdr_search::Result<()> {
/// let config = mdr_search::SearchConfig::default();
/// let response = mdr_search::aggregate("printf", &config).await?;
/// for result in &response.cppref {
///     println!("{}: {}", result.title, result.link);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn aggregate(query: &str, config: &SearchConfig) -> Result<AggregatedResponse> {
    Aggregator::new(config)?.aggregate(query).await
}

/// Search with the default configuration.
///
/// Convenience wrapper around [`aggregate`] using [`SearchConfig::default()`].
/// Without Google credentials the `google` field holds mock results.
///
/// # Errors
///
/// Same as [`aggregate`].
pub async fn aggregate_default(query: &str) -> Result<AggregatedResponse> {
    aggregate(query, &SearchConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn aggregate_validates_config_zero_timeout() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = aggregate("printf", &config).await.unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn aggregate_rejects_empty_query() {
        let err = aggregate("", &SearchConfig::default()).await.unwrap_err();
        assert!(matches!(err, SearchError::EmptyQuery));
    }
}
