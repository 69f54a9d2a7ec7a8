//! Plain-text extraction from HTML pages.

use html5ever::driver::{self, ParseOpts};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use scraper::{ElementRef, Html, HtmlTreeSink};

/// Elements whose content never counts as document text.
const SKIPPED_ELEMENTS: [&str; 2] = ["script", "style"];

/// Extract the visible text of an HTML document.
///
/// Parsing is lenient and never fails on malformed markup. `script` and
/// `style` subtrees are dropped, the remaining text nodes are concatenated
/// in document order, and the result is split into lines which are
/// trimmed, with empty lines removed. Scripting is off while parsing, so
/// the markup inside `noscript` is parsed as elements rather than text.
///
/// # Examples
/// ```
/// use legaldata_harvester::text::extract_text;
///
/// let html = "<script>bad()</script><p>  hello  \n\n world </p>";
/// assert_eq!(extract_text(html), "hello\nworld");
/// ```
pub fn extract_text(html: &str) -> String {
    let document = parse_without_scripting(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_without_scripting(html: &str) -> Html {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    };
    driver::parse_document(HtmlTreeSink::new(Html::new_document()), opts).one(html)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        }
    }
}
