//! Search orchestration: fallback chains, concurrent fan-out, assembly.
//!
//! Each query fans out to two fallback chains (DuckDuckGo → cppreference
//! site search, Google API → mock generator) that run concurrently and are
//! always both awaited. Their outcomes are shaped into one response with a
//! disjoint field per source.

pub mod aggregate;
pub mod assemble;
pub mod fallback;

pub use aggregate::{Aggregator, CppRefChain, GoogleChain};
pub use assemble::assemble;
pub use fallback::{resolve_with_fallback, FallbackChain};
