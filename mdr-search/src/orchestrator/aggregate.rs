//! Fan-out aggregator: runs both fallback chains concurrently and joins them.
//!
//! Neither chain can cancel or delay the other's result. The aggregator
//! waits for both, then assembles the response. Completion order does not
//! matter since each chain fills its own field. A chain that panics is
//! reported as [`SearchError::Join`] and its field is left empty.

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::resolver::Resolver;
use crate::resolver::ResolverOutcome;
use crate::resolvers::{
    CppReferenceResolver, DuckDuckGoResolver, GoogleResolver, MockGoogleResolver,
};
use crate::types::{AggregatedResponse, SourceName};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use super::assemble::assemble;
use super::fallback::FallbackChain;

/// DuckDuckGo (site-scoped) falling back to the cppreference site search.
pub type CppRefChain = FallbackChain<DuckDuckGoResolver, CppReferenceResolver>;

/// Google Custom Search API falling back to the deterministic mock generator.
pub type GoogleChain = FallbackChain<GoogleResolver, MockGoogleResolver>;

/// Concurrent multi-source search aggregator.
///
/// Holds the two configured chains and the per-attempt budget. Cheap to
/// share behind an `Arc`; it keeps no per-request state.
#[derive(Debug, Clone)]
pub struct Aggregator<C = CppRefChain, G = GoogleChain> {
    cppref: C,
    google: G,
    budget: Duration,
}

impl Aggregator {
    /// Build the production chains from `config`, sharing one HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        config.validate()?;
        let client = http::build_client(config)?;

        let cppref = FallbackChain::new(
            DuckDuckGoResolver::new(client.clone(), config),
            CppReferenceResolver::new(client.clone(), config),
        )
        .with_deadline(config.chain_deadline());

        let google = FallbackChain::new(GoogleResolver::new(client, config), MockGoogleResolver)
            .with_deadline(config.chain_deadline());

        Ok(Self::with_chains(cppref, google, config.budget()))
    }
}

impl<C, G> Aggregator<C, G>
where
    C: Resolver,
    G: Resolver,
{
    /// Assemble an aggregator from arbitrary chains.
    ///
    /// `cppref` must produce [`SourceName::CppRef`] results and `google`
    /// [`SourceName::Google`] results.
    pub fn with_chains(cppref: C, google: G, budget: Duration) -> Self {
        debug_assert_eq!(cppref.source(), SourceName::CppRef);
        debug_assert_eq!(google.source(), SourceName::Google);
        Self {
            cppref,
            google,
            budget,
        }
    }

    /// The per-attempt budget handed to every resolver.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Search every configured source for `query`.
    ///
    /// # Pipeline
    ///
    /// 1. Reject an empty or whitespace-only query before any network I/O
    /// 2. Run the cppreference and Google chains concurrently
    /// 3. Wait for both (no early cancellation)
    /// 4. Map failed chains to empty sequences and assemble the response
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyQuery`] only. Upstream failures degrade
    /// to empty or mock results and never surface here.
    pub async fn aggregate(&self, query: &str) -> Result<AggregatedResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        tracing::trace!(query, "aggregating search");

        let (cppref, google) = futures::future::join(
            isolated(SourceName::CppRef, self.cppref.resolve(query, self.budget)),
            isolated(SourceName::Google, self.google.resolve(query, self.budget)),
        )
        .await;

        let response = assemble(cppref, google);
        tracing::debug!(
            cppref = response.cppref.len(),
            google = response.google.len(),
            "search aggregated"
        );
        Ok(response)
    }
}

/// Run one chain, converting a panic inside it into [`SearchError::Join`].
async fn isolated<F>(source: SourceName, chain: F) -> ResolverOutcome
where
    F: Future<Output = ResolverOutcome>,
{
    AssertUnwindSafe(chain)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            let reason = panic_reason(&*panic);
            tracing::error!(source = %source, reason, "search chain panicked");
            Err(SearchError::Join(format!("{source} chain panicked: {reason}")))
        })
}

fn panic_reason(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
