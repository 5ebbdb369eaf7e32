//! DuckDuckGo resolver: site-scoped web search for cppreference pages.
//!
//! Uses the HTML-only endpoint, which needs no JavaScript. The query is
//! scoped to cppreference with a `site:` qualifier so the results are
//! reference pages rather than general web hits.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http::{self, ACCEPT_LANGUAGE, HTML_ACCEPT};
use crate::resolver::{Resolver, ResolverOutcome};
use crate::sanitize::{absolutize_link, sanitize};
use crate::types::{SearchResult, SourceName};
use reqwest::header;
use scraper::Html;
use std::time::Duration;
use url::Url;

use super::{first_text, origin_of, selector};

/// DuckDuckGo HTML search resolver.
///
/// Primary resolver of the cppreference chain. Sends a form-encoded POST
/// with browser-like headers and keeps at most `max_results` entries that
/// have both a title and a link.
#[derive(Debug, Clone)]
pub struct DuckDuckGoResolver {
    client: reqwest::Client,
    endpoint: String,
    origin: String,
    site_qualifier: String,
    max_results: usize,
}

impl DuckDuckGoResolver {
    /// Create a resolver using the shared `client` and the endpoint, site
    /// qualifier and cap from `config`.
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            endpoint: config.duckduckgo_url.clone(),
            origin: origin_of(&config.duckduckgo_url),
            site_qualifier: config.site_qualifier.clone(),
            max_results: config.duckduckgo_max_results,
        }
    }

    /// The full query sent upstream, including the site qualifier.
    fn scoped_query(&self, query: &str) -> String {
        if self.site_qualifier.is_empty() {
            query.to_owned()
        } else {
            format!("{query} {}", self.site_qualifier)
        }
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like: `https://duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`
    /// We parse out the `uddg` query parameter (already percent-decoded by
    /// `query_pairs`). Anything else is returned unchanged.
    fn unwrap_redirect(href: &str) -> String {
        let Ok(parsed) = Url::parse(href) else {
            return href.to_owned();
        };

        let is_redirect = parsed
            .host_str()
            .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
            && parsed.path().starts_with("/l/");

        if !is_redirect {
            return href.to_owned();
        }

        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_else(|| href.to_owned())
    }
}

impl Resolver for DuckDuckGoResolver {
    async fn resolve(&self, query: &str, budget: Duration) -> ResolverOutcome {
        tracing::trace!(query, "DuckDuckGo search");

        let scoped = self.scoped_query(query);
        let request = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, HTML_ACCEPT)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .form(&[("q", scoped.as_str())]);

        let html = http::fetch_text(self.name(), request, budget).await?;
        parse_duckduckgo_html(&html, &self.origin, self.max_results)
    }

    fn name(&self) -> &'static str {
        "DuckDuckGo"
    }

    fn source(&self) -> SourceName {
        SourceName::CppRef
    }

    fn max_results(&self) -> usize {
        self.max_results
    }
}

/// Parse a DuckDuckGo HTML results page.
///
/// Extracted as a separate function for testability with fixture HTML.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] when the page has neither result blocks
/// nor DuckDuckGo's "no results" marker, which is what bot-check and error
/// pages look like.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    origin: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = selector(".result:not(.result--ad)")?;
    let no_results_sel = selector(".no-results")?;
    let title_sel = selector(".result__title")?;
    let anchor_sel = selector("a.result__a")?;
    let url_sel = selector("a.result__url")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut blocks = document.select(&result_sel).peekable();
    if blocks.peek().is_none() {
        if document.select(&no_results_sel).next().is_some() {
            tracing::debug!("DuckDuckGo reported no results");
            return Ok(Vec::new());
        }
        return Err(SearchError::Parse(
            "DuckDuckGo page has no result list".into(),
        ));
    }

    let mut results = Vec::new();

    for block in blocks {
        let title = first_text(block, &title_sel);
        if title.is_empty() {
            continue;
        }

        let href = block
            .select(&anchor_sel)
            .chain(block.select(&url_sel))
            .find_map(|el| el.value().attr("href"))
            .map(str::trim)
            .unwrap_or_default();
        if href.is_empty() {
            continue;
        }

        let link = DuckDuckGoResolver::unwrap_redirect(&absolutize_link(href, origin));
        let snippet = first_text(block, &snippet_sel);

        results.push(sanitize(&title, &snippet, &link, origin));

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}
