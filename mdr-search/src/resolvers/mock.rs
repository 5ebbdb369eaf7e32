//! Deterministic placeholder results for when the Google API is unavailable.
//!
//! Pure: no I/O, no randomness, no clock. The same query always yields
//! byte-identical results.

use crate::resolver::{Resolver, ResolverOutcome};
use crate::sanitize::sanitize;
use crate::types::{SearchResult, SourceName};
use std::time::Duration;
use url::form_urlencoded;

/// Number of results produced by [`mock_results`].
pub const MOCK_RESULT_COUNT: usize = 3;

/// Synthesise the placeholder result set for `query`.
///
/// Links point at fixed tutorial and Q&A site paths with the query
/// escaped into the path by [`query_escape`].
pub fn mock_results(query: &str) -> Vec<SearchResult> {
    let escaped = query_escape(query);

    vec![
        sanitize(
            &format!("{query} - C语言教程 | 菜鸟教程"),
            &format!("C语言是一种通用的、面向过程的计算机程序设计语言，广泛用于底层开发。{query} 是C语言中的重要概念..."),
            &format!("https://www.runoob.com/cprogramming/c-{escaped}.html"),
            "https://www.runoob.com",
        ),
        sanitize(
            &format!("{query} 详解 - C语言中文网"),
            &format!("本文详细介绍了C语言中 {query} 的用法和注意事项，包含多个实例代码..."),
            &format!("https://c.biancheng.net/{escaped}/"),
            "https://c.biancheng.net",
        ),
        sanitize(
            &format!("如何在C语言中正确使用 {query}"),
            &format!("许多初学者在使用 {query} 时会遇到问题，本文将为您详细讲解正确的使用方法..."),
            &format!("https://stackoverflow.com/questions/tagged/{escaped}"),
            "https://stackoverflow.com",
        ),
    ]
}

/// Escape `query` for use inside a URL.
///
/// Spaces become `+`, ASCII alphanumerics and `-_.~` pass through, every
/// other byte is percent-encoded.
pub fn query_escape(query: &str) -> String {
    // byte_serialize keeps `*` and encodes `~`; the unreserved set is the reverse.
    form_urlencoded::byte_serialize(query.as_bytes())
        .collect::<String>()
        .replace('*', "%2A")
        .replace("%7E", "~")
}

/// Resolver wrapper around [`mock_results`]. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGoogleResolver;

impl Resolver for MockGoogleResolver {
    async fn resolve(&self, query: &str, _budget: Duration) -> ResolverOutcome {
        tracing::debug!("serving mock Google results");
        Ok(mock_results(query))
    }

    fn name(&self) -> &'static str {
        "Google mock"
    }

    fn source(&self) -> SourceName {
        SourceName::Google
    }

    fn max_results(&self) -> usize {
        MOCK_RESULT_COUNT
    }
}
