//! cppreference resolver: the site's own MediaWiki full-text search.
//!
//! Secondary resolver of the cppreference chain, used when DuckDuckGo
//! fails. Result links on the wiki are root-relative and are resolved
//! against the configured site origin.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http::{self, ACCEPT_LANGUAGE, HTML_ACCEPT};
use crate::resolver::{Resolver, ResolverOutcome};
use crate::sanitize::sanitize;
use crate::types::{SearchResult, SourceName};
use reqwest::header;
use scraper::Html;
use std::time::Duration;

use super::{first_text, selector};

/// cppreference site-search resolver.
#[derive(Debug, Clone)]
pub struct CppReferenceResolver {
    client: reqwest::Client,
    origin: String,
    search_url: String,
    search_title: String,
    max_results: usize,
}

impl CppReferenceResolver {
    /// Create a resolver using the shared `client` and the site origin,
    /// search path and cap from `config`.
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Self {
        let origin = config.cppreference_origin.trim_end_matches('/').to_owned();
        let search_url = format!("{origin}{}", config.cppreference_search_path);
        Self {
            client,
            origin,
            search_url,
            search_title: config.cppreference_search_title.clone(),
            max_results: config.cppreference_max_results,
        }
    }
}

impl Resolver for CppReferenceResolver {
    async fn resolve(&self, query: &str, budget: Duration) -> ResolverOutcome {
        tracing::trace!(query, "cppreference search");

        let request = self
            .client
            .get(&self.search_url)
            .header(header::ACCEPT, HTML_ACCEPT)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .query(&[
                ("title", self.search_title.as_str()),
                ("search", query),
                ("fulltext", "1"),
            ]);

        let html = http::fetch_text(self.name(), request, budget).await?;
        parse_cppreference_html(&html, &self.origin, self.max_results)
    }

    fn name(&self) -> &'static str {
        "cppreference"
    }

    fn source(&self) -> SourceName {
        SourceName::CppRef
    }

    fn max_results(&self) -> usize {
        self.max_results
    }
}

/// Parse a MediaWiki `Special:Search` results page.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] when the page carries neither a result
/// list nor the wiki's "no matches" notice.
pub(crate) fn parse_cppreference_html(
    html: &str,
    origin: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let list_sel = selector("ul.mw-search-results")?;
    let item_sel = selector("ul.mw-search-results > li")?;
    let none_found_sel = selector(".mw-search-nonefound")?;
    let heading_sel = selector(".mw-search-result-heading a")?;
    let desc_sel = selector(".searchresult")?;

    if document.select(&list_sel).next().is_none() {
        if document.select(&none_found_sel).next().is_some() {
            tracing::debug!("cppreference reported no matches");
            return Ok(Vec::new());
        }
        return Err(SearchError::Parse(
            "cppreference page has no search result list".into(),
        ));
    }

    let mut results = Vec::new();

    for item in document.select(&item_sel) {
        let Some(anchor) = item.select(&heading_sel).next() else {
            continue;
        };
        let title = super::element_text(anchor);
        let href = anchor.value().attr("href").map(str::trim).unwrap_or_default();
        if title.is_empty() || href.is_empty() {
            continue;
        }

        let description = first_text(item, &desc_sel);
        results.push(sanitize(&title, &description, href, origin));

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "cppreference results parsed");
    Ok(results)
}
