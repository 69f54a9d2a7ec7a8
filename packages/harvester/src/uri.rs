//! Resolution of the relative hrefs found on harvested pages.
//!
//! Site HTML only ever uses five forms of reference, so this is a small
//! string-level resolver rather than a full RFC 3986 merge. A `../`
//! prefix climbs exactly one path segment of the base, even when the href
//! starts with `../../`.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("valid regex"));

/// Resolve `url` against `base`.
///
/// Total: every input produces a string, malformed input is not detected.
///
/// # Examples
/// ```
/// use legaldata_harvester::uri::resolve_url;
///
/// let base = "https://www.fsa.go.jp";
/// assert_eq!(resolve_url("https://example.com/a.pdf", base), "https://example.com/a.pdf");
/// assert_eq!(resolve_url("/news/index.html", base), "https://www.fsa.go.jp/news/index.html");
/// assert_eq!(resolve_url("./a.pdf", base), "https://www.fsa.go.jp/a.pdf");
/// assert_eq!(resolve_url("a.pdf", base), "https://www.fsa.go.jp/a.pdf");
/// assert_eq!(resolve_url("../x", "https://a.b/p/q"), "https://a.b/p/x");
/// ```
pub fn resolve_url(url: &str, base: &str) -> String {
    if ABSOLUTE_URL.is_match(url) {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{base}{url}")
    } else if url.starts_with("./") {
        format!("{base}{}", &url[1..])
    } else if url.starts_with("../") {
        format!("{}{}", parent_base(base), &url[2..])
    } else {
        format!("{base}/{url}")
    }
}

/// Drop the last segment of the base's path, keeping scheme, host, query
/// and fragment where they are. A path with a single segment becomes `/`.
fn parent_base(base: &str) -> String {
    let path_start = match base.find("://") {
        Some(i) => {
            let authority = i + 3;
            base[authority..]
                .find(['/', '?', '#'])
                .map_or(base.len(), |j| authority + j)
        }
        None => 0,
    };
    let path_end = base[path_start..]
        .find(['?', '#'])
        .map_or(base.len(), |j| path_start + j);

    let segments: Vec<&str> = base[path_start..path_end].split('/').collect();
    let parent = if segments.len() > 1 {
        segments[..segments.len() - 1].join("/")
    } else {
        "/".to_string()
    };

    format!("{}{}{}", &base[..path_start], parent, &base[path_end..])
}

/// Host component of a URL, or `None` when it has none or does not parse.
///
/// # Examples
/// ```
/// use legaldata_harvester::uri::hostname;
///
/// assert_eq!(hostname("https://www.jpx.co.jp/rules/"), Some("www.jpx.co.jp".to_string()));
/// assert_eq!(hostname("not a url"), None);
/// ```
pub fn hostname(url: &str) -> Option<String> {
    ::url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
