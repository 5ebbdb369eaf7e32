//! Primary/secondary fallback between two resolvers.
//!
//! The secondary runs strictly after the primary's outcome is known and
//! only if the primary failed. Failures are logged here, at the boundary
//! where they stop propagating.

use crate::error::SearchError;
use crate::resolver::{Resolver, ResolverOutcome};
use crate::types::SourceName;
use std::future::Future;
use std::time::{Duration, Instant};

/// Invoke `primary`; on failure, invoke `secondary` with the same query and
/// budget and return its outcome.
pub async fn resolve_with_fallback<P, S>(
    primary: &P,
    secondary: &S,
    query: &str,
    budget: Duration,
) -> ResolverOutcome
where
    P: Resolver,
    S: Resolver,
{
    run_chain(primary, secondary, query, budget, None).await
}

/// A resolver pair where `secondary` stands in for a failed `primary`.
///
/// Optionally bounded by a deadline covering both attempts: an expired
/// deadline counts as a primary failure, and the secondary then gets
/// whatever time remains.
#[derive(Debug, Clone)]
pub struct FallbackChain<P, S> {
    primary: P,
    secondary: S,
    deadline: Option<Duration>,
}

impl<P, S> FallbackChain<P, S>
where
    P: Resolver,
    S: Resolver,
{
    /// Pair `primary` with `secondary`, with no chain-level deadline.
    pub fn new(primary: P, secondary: S) -> Self {
        Self {
            primary,
            secondary,
            deadline: None,
        }
    }

    /// Bound the whole chain (primary plus secondary) by `deadline`.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// The primary resolver.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// The secondary resolver.
    pub fn secondary(&self) -> &S {
        &self.secondary
    }
}

impl<P, S> Resolver for FallbackChain<P, S>
where
    P: Resolver,
    S: Resolver,
{
    async fn resolve(&self, query: &str, budget: Duration) -> ResolverOutcome {
        run_chain(&self.primary, &self.secondary, query, budget, self.deadline).await
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }

    fn source(&self) -> SourceName {
        self.primary.source()
    }

    fn max_results(&self) -> usize {
        self.primary.max_results().max(self.secondary.max_results())
    }
}

async fn run_chain<P, S>(
    primary: &P,
    secondary: &S,
    query: &str,
    budget: Duration,
    deadline: Option<Duration>,
) -> ResolverOutcome
where
    P: Resolver,
    S: Resolver,
{
    let started = Instant::now();

    let err = match within(deadline, primary.name(), primary.resolve(query, budget)).await {
        Ok(results) => {
            tracing::debug!(
                resolver = primary.name(),
                count = results.len(),
                "primary resolver succeeded"
            );
            return Ok(results);
        }
        Err(err) => err,
    };

    tracing::warn!(
        resolver = primary.name(),
        error = %err,
        fallback = secondary.name(),
        "primary resolver failed, falling back"
    );

    let remaining = deadline.map(|d| d.saturating_sub(started.elapsed()));
    match within(remaining, secondary.name(), secondary.resolve(query, budget)).await {
        Ok(results) => {
            tracing::info!(
                resolver = secondary.name(),
                count = results.len(),
                "fallback resolver succeeded"
            );
            Ok(results)
        }
        Err(err) => {
            tracing::warn!(resolver = secondary.name(), error = %err, "fallback resolver failed");
            Err(err)
        }
    }
}

/// Await `attempt`, bounded by `limit` when one is set.
///
/// The attempt is polled before the limit is checked, so an attempt that is
/// immediately ready still completes under a zero limit.
async fn within<F>(limit: Option<Duration>, name: &'static str, attempt: F) -> ResolverOutcome
where
    F: Future<Output = ResolverOutcome>,
{
    match limit {
        None => attempt.await,
        Some(limit) => tokio::time::timeout(limit, attempt)
            .await
            .unwrap_or_else(|_| {
                Err(SearchError::Timeout(format!(
                    "{name}: chain deadline of {}ms exceeded",
                    limit.as_millis()
                )))
            }),
    }
}
