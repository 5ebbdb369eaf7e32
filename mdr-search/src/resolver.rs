//! Trait definition for pluggable search source resolvers.
//!
//! Each upstream (DuckDuckGo, cppreference, Google, and the mock generator
//! standing in for Google) implements [`Resolver`] so fallback chains and
//! the aggregator can treat them uniformly.

use crate::error::SearchError;
use crate::types::{SearchResult, SourceName};
use std::time::Duration;

/// Outcome of one resolver attempt. Never exposed past the aggregator.
pub type ResolverOutcome = Result<Vec<SearchResult>, SearchError>;

/// A source of search results.
///
/// Implementors perform at most one upstream request per call and handle
/// their own:
///
/// - request construction and query qualifiers
/// - response parsing (HTML or JSON)
/// - result capping and sanitisation
///
/// Every failure is returned as an `Err`; resolvers never retry. Retrying
/// with another source is the job of [`crate::orchestrator::FallbackChain`].
///
/// All implementations must be `Send + Sync` so chains can run concurrently.
pub trait Resolver: Send + Sync {
    /// Resolve `query` within the per-attempt `budget`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on transport failure, non-2xx status, timeout,
    /// or a body that does not match the expected format.
    fn resolve(
        &self,
        query: &str,
        budget: Duration,
    ) -> impl std::future::Future<Output = ResolverOutcome> + Send;

    /// Short human-readable name used in logs.
    fn name(&self) -> &'static str;

    /// Which response field this resolver's results populate.
    fn source(&self) -> SourceName;

    /// Maximum number of results this resolver returns.
    fn max_results(&self) -> usize;
}
