//! Selector helpers over `scraper` shared by the site loaders.

use scraper::{ElementRef, Html, Selector};

use crate::error::{HarvesterError, Result};

/// Parse a CSS selector.
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HarvesterError::InvalidSelector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// All elements matching `css`, in document order.
pub fn select_all<'a>(document: &'a Html, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let selector = selector(css)?;
    Ok(document.select(&selector).collect())
}

/// First element matching `css` below `element`.
pub fn select_first_in<'a>(element: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
    let selector = selector(css)?;
    Ok(element.select(&selector).next())
}

/// Concatenated text of an element and its descendants.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Value of the `href` attribute.
pub fn href<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element.value().attr("href")
}

/// Every `href` in the document that ends with `.pdf`.
pub fn pdf_hrefs(document: &Html) -> Result<Vec<String>> {
    Ok(select_all(document, "a[href]")?
        .into_iter()
        .filter_map(href)
        .filter(|h| h.ends_with(".pdf"))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_selector() {
        let err = selector("div[").unwrap_err();
        assert!(matches!(err, HarvesterError::InvalidSelector { .. }));
    }

    #[test]
    fn test_pdf_hrefs() {
        let document = Html::parse_document(
            r#"<a href="/a.pdf">A</a><a href="b.html">B</a><a>none</a><a href="./c.pdf">C</a>"#,
        );
        assert_eq!(pdf_hrefs(&document).unwrap(), vec!["/a.pdf", "./c.pdf"]);
    }

    #[test]
    fn test_element_text() {
        let document = Html::parse_fragment("<li><a href='x'>第1条</a> 施行</li>");
        let li = select_all(&document, "li").unwrap()[0];
        assert_eq!(element_text(li), "第1条 施行");
        let a = select_first_in(li, "a").unwrap().unwrap();
        assert_eq!(href(a), Some("x"));
    }
}
