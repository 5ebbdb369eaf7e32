//! Text sanitisation applied to every result before it leaves a resolver.
//!
//! Trims titles and descriptions, bounds description length, and turns
//! relative links into absolute URLs on the producing site's origin.

use crate::types::SearchResult;
use url::Url;

/// Maximum description length in characters before truncation.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Marker appended to a truncated description.
pub const ELLIPSIS: &str = "...";

/// Build a [`SearchResult`] from raw parser output.
///
/// `origin` is the scheme and host of the site that produced the link
/// (e.g. `https://zh.cppreference.com`).
pub fn sanitize(title: &str, raw_description: &str, raw_link: &str, origin: &str) -> SearchResult {
    SearchResult {
        title: title.trim().to_owned(),
        description: truncate_description(raw_description.trim()),
        link: absolutize_link(raw_link.trim(), origin),
    }
}

/// Truncate `text` to [`MAX_DESCRIPTION_CHARS`] characters, appending
/// [`ELLIPSIS`] when anything was cut.
pub fn truncate_description(text: &str) -> String {
    match text.char_indices().nth(MAX_DESCRIPTION_CHARS) {
        None => text.to_owned(),
        Some((end, _)) => {
            let mut truncated = String::with_capacity(end + ELLIPSIS.len());
            truncated.push_str(&text[..end]);
            truncated.push_str(ELLIPSIS);
            truncated
        }
    }
}

/// Resolve `link` against `origin` unless it already carries a URL scheme.
///
/// Protocol-relative links (`//host/path`) are given `https:`.
pub fn absolutize_link(link: &str, origin: &str) -> String {
    if let Some(rest) = link.strip_prefix("//") {
        return format!("https://{rest}");
    }
    if has_scheme(link) {
        return link.to_owned();
    }

    match Url::parse(origin).and_then(|base| base.join(link)) {
        Ok(joined) => joined.to_string(),
        Err(_) => {
            let origin = origin.trim_end_matches('/');
            if link.starts_with('/') {
                format!("{origin}{link}")
            } else {
                format!("{origin}/{link}")
            }
        }
    }
}

/// Collapse runs of whitespace (including newlines) to single spaces.
///
/// HTML text nodes carry the markup's indentation; parsers run extracted
/// text through this before handing it to [`sanitize`].
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// RFC 3986 scheme check: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`.
fn has_scheme(link: &str) -> bool {
    let Some((scheme, _)) = link.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
