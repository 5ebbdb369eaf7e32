//! Source resolver implementations.
//!
//! Each module provides a struct implementing [`crate::resolver::Resolver`]
//! for one upstream. The HTML resolvers share the selector and text
//! helpers below.

pub mod cppreference;
pub mod duckduckgo;
pub mod google;
pub mod mock;

pub use cppreference::CppReferenceResolver;
pub use duckduckgo::DuckDuckGoResolver;
pub use google::GoogleResolver;
pub use mock::{mock_results, query_escape, MockGoogleResolver};

use crate::error::SearchError;
use crate::sanitize::collapse_whitespace;
use scraper::{ElementRef, Selector};
use url::Url;

/// Compile a CSS selector, mapping failures to [`SearchError::Parse`].
pub(crate) fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("invalid selector {css:?}: {e:?}")))
}

/// Text content of an element with markup whitespace collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Text of the first descendant of `element` matching `sel`, or empty.
pub(crate) fn first_text(element: ElementRef<'_>, sel: &Selector) -> String {
    element
        .select(sel)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Scheme and host (plus non-default port) of `url`, without a trailing slash.
///
/// Falls back to the input unchanged when it cannot be parsed.
pub(crate) fn origin_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.origin().ascii_serialization(),
        Err(_) => url.trim_end_matches('/').to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn origin_of_strips_path() {
        assert_eq!(origin_of("https://duckduckgo.com/html/"), "https://duckduckgo.com");
        assert_eq!(origin_of("http://127.0.0.1:8080/x/y"), "http://127.0.0.1:8080");
    }

    #[test]
    fn origin_of_unparseable_is_passthrough() {
        assert_eq!(origin_of("nonsense/"), "nonsense");
    }

    #[test]
    fn first_text_collapses_whitespace() {
        let html = Html::parse_fragment("<div><p class=\"s\">\n  hello\n   world  </p></div>");
        let sel = selector(".s").expect("selector");
        let root = html.root_element();
        assert_eq!(first_text(root, &sel), "hello world");
    }

    #[test]
    fn first_text_missing_is_empty() {
        let html = Html::parse_fragment("<div></div>");
        let sel = selector(".missing").expect("selector");
        assert_eq!(first_text(html.root_element(), &sel), "");
    }

    #[test]
    fn invalid_selector_is_parse_error() {
        let err = selector("<<").unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }
}
