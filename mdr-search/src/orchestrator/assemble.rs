//! Shapes per-chain outcomes into the external response contract.

use crate::resolver::ResolverOutcome;
use crate::types::{AggregatedResponse, SearchResult, SourceName};

/// Convert one chain's outcome to its result sequence.
///
/// A failed chain contributes an empty sequence; the cause is logged, never
/// surfaced to the caller.
pub fn into_results(source: SourceName, outcome: ResolverOutcome) -> Vec<SearchResult> {
    match outcome {
        Ok(results) => {
            tracing::debug!(%source, count = results.len(), "source returned results");
            results
        }
        Err(err) => {
            tracing::warn!(%source, error = %err, "source failed, returning no results");
            Vec::new()
        }
    }
}

/// Build the response from the cppreference and Google chain outcomes.
///
/// `mct` has no resolver wired to it and is always empty.
pub fn assemble(cppref: ResolverOutcome, google: ResolverOutcome) -> AggregatedResponse {
    AggregatedResponse {
        mct: Vec::new(),
        cppref: into_results(SourceName::CppRef, cppref),
        google: into_results(SourceName::Google, google),
    }
}
