//! e-Gov law API (elaws.e-gov.go.jp).
//!
//! The law list endpoint returns one `LawNameListInfo` element per law; the
//! law data endpoint returns the full text of one law as XML.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::Client;
use roxmltree::Document;

use super::Source;
use crate::config::EGOV_BASE_URL;
use crate::error::{HarvesterError, Result};
use crate::http::fetch_xml_text;
use crate::link::{LawEntry, Link, LinkDetails};
use crate::loader::{Harvest, Loader};
use crate::xml::{child_text, elements_named};

/// Categories of the law list: 1 all, 2 acts (法律), 3 cabinet orders (政令),
/// 4 ministerial ordinances (省令).
const CATEGORIES: std::ops::RangeInclusive<u8> = 1..=4;

/// Parenthesized asides (full-width parentheses), innermost level.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("（[^（|^）]*）").expect("valid regex"));

/// Loader for the e-Gov law list.
pub struct EgovLoader {
    client: Client,
    base_url: String,
    category: String,
}

impl EgovLoader {
    pub fn new(client: Client, category: impl Into<String>) -> Self {
        Self {
            client,
            base_url: EGOV_BASE_URL.to_string(),
            category: category.into(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Law list category, validated.
    pub fn category(&self) -> Result<u8> {
        self.category
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|c| CATEGORIES.contains(c))
            .ok_or_else(|| {
                HarvesterError::invalid_config(
                    "category",
                    &self.category,
                    "1 (all), 2 (法律), 3 (政令) or 4 (省令)",
                )
            })
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    /// Map of law names to law numbers for the current category.
    pub fn law_names(&self) -> Result<BTreeMap<String, String>> {
        let xml = fetch_xml_text(&self.client, &self.url()?)?;
        let laws = parse_law_list(&xml, &self.base_url)?;
        Ok(laws
            .items
            .into_iter()
            .filter_map(|link| match link.details {
                LinkDetails::Egov(entry) => Some((entry.law_name, entry.law_number)),
                _ => None,
            })
            .collect())
    }

    /// Every non-empty text fragment of a law data document.
    pub fn fetch_raw_text(&self, url: &str) -> Result<Vec<String>> {
        parse_raw_text(&fetch_xml_text(&self.client, url)?)
    }
}

impl Loader for EgovLoader {
    fn source(&self) -> Source {
        Source::Egov
    }

    fn url(&self) -> Result<String> {
        Ok(format!("{}/api/1/lawlists/{}", self.base_url, self.category()?))
    }

    fn harvest(&self) -> Result<Harvest<Link>> {
        let xml = fetch_xml_text(&self.client, &self.url()?)?;
        parse_law_list(&xml, &self.base_url)
    }
}

/// Parse a law list document into law data links.
///
/// A malformed document is an error; an entry missing one of its fields is
/// skipped with a warning.
pub fn parse_law_list(xml: &str, base_url: &str) -> Result<Harvest<Link>> {
    let doc = Document::parse(xml)?;

    let rows = elements_named(&doc, "LawNameListInfo").map(|info| {
        let field = |tag: &str| {
            child_text(info, tag).ok_or_else(|| HarvesterError::missing(tag, "LawNameListInfo"))
        };
        let entry = LawEntry {
            law_id: field("LawId")?,
            law_name: field("LawName")?,
            law_number: field("LawNo")?,
            promulgation_date: field("PromulgationDate")?,
        };
        let url = format!("{base_url}/api/1/lawdata/{}", entry.law_number);
        Ok(Link::new(url, LinkDetails::Egov(entry)))
    });

    Ok(Harvest::from_rows("law", rows))
}

/// Trimmed, non-empty direct text of every element, in document order.
pub fn parse_raw_text(xml: &str) -> Result<Vec<String>> {
    let doc = Document::parse(xml)?;
    Ok(doc
        .descendants()
        .filter(|n| n.is_element())
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect())
}

/// Reduce raw law text to its sentences.
///
/// Keeps fragments ending with `。`, joins them, removes `「` and `」`, and
/// drops full-width parenthesized asides.
///
/// # Examples
/// ```
/// use legaldata_harvester::sources::preprocess_law_text;
///
/// let raw = vec![
///     "第一条".to_string(),
///     "この法律は、「国民経済」の健全な発展（以下「目的」という。）に資する。".to_string(),
/// ];
/// assert_eq!(preprocess_law_text(&raw), "この法律は、国民経済の健全な発展に資する。");
/// ```
pub fn preprocess_law_text(raw: &[String]) -> String {
    let joined: String = raw
        .iter()
        .filter(|s| s.ends_with('。'))
        .map(String::as_str)
        .collect();
    let unquoted: String = joined.chars().filter(|c| !matches!(c, '「' | '」')).collect();
    PARENTHESIZED.replace_all(&unquoted, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::http::create_client;
    use pretty_assertions::assert_eq;

    const LAW_LIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DataRoot>
  <Result><Code>0</Code><Message/></Result>
  <ApplData>
    <Category>2</Category>
    <LawNameListInfo>
      <LawId>323AC0000000025</LawId>
      <LawName>金融商品取引法</LawName>
      <LawNo>昭和二十三年法律第二十五号</LawNo>
      <PromulgationDate>19480413</PromulgationDate>
    </LawNameListInfo>
    <LawNameListInfo>
      <LawId>999AC0000000001</LawId>
      <LawName>番号のない法律</LawName>
      <PromulgationDate>19990101</PromulgationDate>
    </LawNameListInfo>
    <LawNameListInfo>
      <LawId>410AC0000000107</LawId>
      <LawName>資産の流動化に関する法律</LawName>
      <LawNo>平成十年法律第百五号</LawNo>
      <PromulgationDate>19980615</PromulgationDate>
    </LawNameListInfo>
  </ApplData>
</DataRoot>"#;

    #[test]
    fn test_parse_law_list() {
        let harvest = parse_law_list(LAW_LIST, EGOV_BASE_URL).unwrap();

        assert_eq!(harvest.items.len(), 2);
        assert_eq!(harvest.warning_count(), 1);
        assert!(harvest.warnings[0].contains("LawNo"));

        let first = &harvest.items[0];
        assert_eq!(
            first.url,
            "https://elaws.e-gov.go.jp/api/1/lawdata/昭和二十三年法律第二十五号"
        );
        assert_eq!(first.category, "e-Gov");
        assert_eq!(
            first.details,
            LinkDetails::Egov(LawEntry {
                law_id: "323AC0000000025".to_string(),
                law_name: "金融商品取引法".to_string(),
                law_number: "昭和二十三年法律第二十五号".to_string(),
                promulgation_date: "19480413".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_law_list_malformed_document() {
        assert!(parse_law_list("<DataRoot><ApplData>", EGOV_BASE_URL).is_err());
    }

    #[test]
    fn test_parse_raw_text() {
        let xml = "<Law><LawBody><LawTitle> 金融商品取引法 </LawTitle>\
                   <Article><Sentence>この法律は、目的とする。</Sentence><Empty>  </Empty></Article>\
                   </LawBody></Law>";
        assert_eq!(
            parse_raw_text(xml).unwrap(),
            vec!["金融商品取引法", "この法律は、目的とする。"]
        );
    }

    #[test]
    fn test_preprocess_keeps_only_sentences() {
        let raw = vec![
            "第一章　総則".to_string(),
            "第一条".to_string(),
            "第一文である。".to_string(),
            "第二文（括弧書き）である。".to_string(),
        ];
        assert_eq!(preprocess_law_text(&raw), "第一文である。第二文である。");
    }

    #[test]
    fn test_category_validated_lazily() {
        let client = create_client(&FetchConfig::default()).unwrap();
        let mut loader = EgovLoader::new(client, "2");
        assert_eq!(loader.url().unwrap(), "https://elaws.e-gov.go.jp/api/1/lawlists/2");

        loader.set_category("9");
        assert!(loader.url().is_err());

        loader.set_category("all");
        let err = loader.url().unwrap_err();
        assert!(matches!(err, HarvesterError::InvalidConfig { field: "category", .. }));
        assert!(err.to_string().starts_with("Invalid category 'all'"));
    }
}
