//! XML utility functions for navigating `roxmltree` documents.

use roxmltree::{Document, Node};

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use legaldata_harvester::xml::get_tag_name;
///
/// let doc = Document::parse("<DataRoot><LawId>x</LawId></DataRoot>").unwrap();
/// let law_id = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(law_id), "LawId");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given tag name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Trimmed direct text of the first child element named `tag`.
pub fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    find_child(node, tag)
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
}

/// All elements in the document with the given tag name, in document order.
pub fn elements_named<'a, 'input>(
    doc: &'a Document<'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.descendants()
        .filter(move |n| n.is_element() && get_tag_name(*n) == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = "<root><item><name> A </name></item><item><name>B</name><empty/></item></root>";

    #[test]
    fn test_find_child() {
        let doc = Document::parse(XML).unwrap();
        let item = doc.root_element().first_element_child().unwrap();
        assert!(find_child(item, "name").is_some());
        assert!(find_child(item, "missing").is_none());
    }

    #[test]
    fn test_child_text() {
        let doc = Document::parse(XML).unwrap();
        let items: Vec<_> = elements_named(&doc, "item").collect();
        assert_eq!(items.len(), 2);
        assert_eq!(child_text(items[0], "name"), Some("A".to_string()));
        assert_eq!(child_text(items[1], "empty"), None);
    }
}
