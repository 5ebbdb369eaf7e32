//! Core types for search results and source identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single search result, normalised across every upstream.
///
/// Built only through [`crate::sanitize::sanitize`] by the resolvers, so the
/// description is bounded and the link is absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title, whitespace-trimmed.
    pub title: String,
    /// Snippet text, at most 200 characters plus an ellipsis marker.
    pub description: String,
    /// Absolute URL of the result.
    pub link: String,
}

/// Which upstream produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceName {
    /// First-party source. Reserved; always empty.
    Mct,
    /// cppreference, reached through DuckDuckGo or its own site search.
    CppRef,
    /// Google Custom Search, or the mock generator standing in for it.
    Google,
}

impl SourceName {
    /// Returns the field name used for this source in the response contract.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mct => "mct",
            Self::CppRef => "cppref",
            Self::Google => "google",
        }
    }

    /// Returns all source variants in response field order.
    pub fn all() -> &'static [SourceName] {
        &[Self::Mct, Self::CppRef, Self::Google]
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The aggregated response, one ordered sequence per source.
///
/// Every field is always present; a source that failed contributes `[]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResponse {
    /// First-party results (always empty).
    pub mct: Vec<SearchResult>,
    /// cppreference results, at most 15.
    pub cppref: Vec<SearchResult>,
    /// Google results (live or mock), at most 15.
    pub google: Vec<SearchResult>,
}

impl AggregatedResponse {
    /// Returns the result sequence for the given source.
    pub fn results_for(&self, source: SourceName) -> &[SearchResult] {
        match source {
            SourceName::Mct => &self.mct,
            SourceName::CppRef => &self.cppref,
            SourceName::Google => &self.google,
        }
    }
}
