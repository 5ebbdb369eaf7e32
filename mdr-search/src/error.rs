//! Error types for the mdr-search crate.
//!
//! Every upstream failure is local to one resolver attempt. The fallback
//! chain consumes these errors; only [`SearchError::EmptyQuery`] is ever
//! meant to reach a client. No API keys appear in error messages.

/// Errors that can occur while resolving or aggregating a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query was empty or whitespace-only. Raised before any network I/O.
    #[error("query must not be empty")]
    EmptyQuery,

    /// Connection, DNS, TLS or body-read failure talking to an upstream.
    #[error("HTTP error: {0}")]
    Http(String),

    /// An upstream answered with a non-2xx status.
    #[error("{upstream} returned HTTP {code}")]
    Status {
        /// Which upstream answered.
        upstream: &'static str,
        /// The HTTP status code received.
        code: u16,
    },

    /// An attempt exceeded its time budget.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The response body did not match the expected HTML or JSON shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration or missing upstream credentials.
    #[error("config error: {0}")]
    Config(String),

    /// A chain's unit of work did not complete normally.
    #[error("search task failed: {0}")]
    Join(String),
}

impl SearchError {
    /// Classify a [`reqwest::Error`] raised while talking to `upstream`.
    pub fn from_reqwest(upstream: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout(format!("{upstream}: {err}"));
        }
        if let Some(status) = err.status() {
            return Self::Status {
                upstream,
                code: status.as_u16(),
            };
        }
        Self::Http(format!("{upstream}: {err}"))
    }

    /// Whether this error was raised by input validation rather than an upstream.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyQuery)
    }
}

/// Convenience type alias for mdr-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
