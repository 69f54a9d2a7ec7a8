//! Japan Securities Dealers Association: association rules and the
//! self-regulation web handbook.

use reqwest::blocking::Client;
use scraper::Html;

use super::{pdf_links, Source};
use crate::config::{JSDA_BASE_URL, JSDA_KISOKU_URL};
use crate::error::{HarvesterError, Result};
use crate::html::{element_text, href, select_all};
use crate::http::fetch_html;
use crate::link::{Link, LinkDetails};
use crate::loader::{Harvest, Loader};
use crate::uri::resolve_url;

/// Parse the rule list: every `.pdf` anchor, resolved against the page URL.
pub fn parse_jsda_pdf_links(html: &str, url: &str) -> Result<Vec<Link>> {
    let document = Html::parse_document(html);
    pdf_links(&document, url, |url| Link::new(url, LinkDetails::Jsda))
}

/// Loader for the JSDA association rules.
pub struct JsdaLoader {
    client: Client,
    url: String,
}

impl JsdaLoader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: JSDA_KISOKU_URL.to_string(),
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }
}

impl Loader for JsdaLoader {
    fn source(&self) -> Source {
        Source::Jsda
    }

    fn url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    fn harvest(&self) -> Result<Harvest<Link>> {
        let html = fetch_html(&self.client, &self.url)?;
        let mut harvest = Harvest::new();
        for link in parse_jsda_pdf_links(&html, &self.url)? {
            harvest.push(link);
        }
        Ok(harvest)
    }
}

/// A document type of the web handbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandbookType {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl HandbookType {
    /// Types numbered 300 and above use a different page layout.
    fn is_reference(&self) -> bool {
        self.id >= "300"
    }

    fn selector(&self) -> &'static str {
        if self.is_reference() {
            "div.jsda_table01 table a"
        } else {
            "table.web-handbook li a"
        }
    }
}

const fn handbook(id: &'static str, name: &'static str, description: &'static str) -> HandbookType {
    HandbookType {
        id,
        name,
        description,
    }
}

static HANDBOOK_TYPES: [HandbookType; 16] = [
    handbook("101", "kanri", "協会員における顧客管理、内部管理等"),
    handbook("102", "jyugyoin", "従業員、外務員関係"),
    handbook("103", "koukoku", "広告関係"),
    handbook("104", "kojin-jyoho", "個人情報関係"),
    handbook("105", "kabushiki", "株式関係"),
    handbook("106", "saiken", "債券関係"),
    handbook("107", "foreign", "外国証券・取引関係"),
    handbook("108", "syoukenka", "証券化商品関係"),
    handbook("109", "deri", "デリバティブ関係"),
    handbook("110", "rinri", "倫理コード関係"),
    handbook("201", "kansyuu", "統一慣習規則（※２）"),
    handbook("202", "hunsou", "紛争処理規則（※３）"),
    handbook("203", "rijikai", "理事会決議（※４）等"),
    handbook("204", "seido", "制度"),
    handbook("301", "hourei", "法令等の解釈に関するＱ＆Ａ・ガイドライン等"),
    handbook("302", "eigyo", "営業ルール照会制度"),
];

/// Look up a handbook type by its three-digit id.
///
/// # Examples
/// ```
/// use legaldata_harvester::sources::handbook_type;
///
/// assert_eq!(handbook_type("109").map(|t| t.name), Some("deri"));
/// assert!(handbook_type("999").is_none());
/// ```
#[must_use]
pub fn handbook_type(id: &str) -> Option<&'static HandbookType> {
    HANDBOOK_TYPES.iter().find(|t| t.id == id)
}

/// Every handbook type, ordered by id.
#[must_use]
pub fn handbook_types() -> &'static [HandbookType] {
    &HANDBOOK_TYPES
}

/// Parse a handbook page of the given type.
///
/// Hrefs under `/about` are resolved against the JSDA site root, all others
/// against the page URL.
pub fn parse_handbook_links(
    html: &str,
    handbook_type: &HandbookType,
    page_url: &str,
    site_url: &str,
) -> Result<Harvest<Link>> {
    let document = Html::parse_document(html);
    let rows = select_all(&document, handbook_type.selector())?
        .into_iter()
        .map(|a| -> Result<Link> {
            let target =
                href(a).ok_or_else(|| HarvesterError::missing("href", "handbook anchor"))?;
            let base = if target.starts_with("/about") {
                site_url
            } else {
                page_url
            };
            let details = LinkDetails::JsdaHandbook {
                type_name: handbook_type.name.to_string(),
                type_desc: handbook_type.description.to_string(),
                title: element_text(a).trim().to_string(),
            };
            Ok(Link::new(resolve_url(target, base), details))
        });
    Ok(Harvest::from_rows("handbook entry", rows))
}

/// Loader for one document type of the JSDA web handbook.
pub struct JsdaHandbookLoader {
    client: Client,
    base_url: String,
    type_id: String,
}

impl JsdaHandbookLoader {
    pub fn new(client: Client, type_id: impl Into<String>) -> Self {
        Self {
            client,
            base_url: JSDA_BASE_URL.to_string(),
            type_id: type_id.into(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Document type, validated against the known ids.
    pub fn handbook_type(&self) -> Result<&'static HandbookType> {
        handbook_type(&self.type_id).ok_or_else(|| {
            HarvesterError::invalid_config("type id", &self.type_id, "a web handbook type id")
        })
    }

    pub fn set_type_id(&mut self, type_id: impl Into<String>) {
        self.type_id = type_id.into();
    }
}

impl Loader for JsdaHandbookLoader {
    fn source(&self) -> Source {
        Source::JsdaHandbook
    }

    fn url(&self) -> Result<String> {
        let handbook_type = self.handbook_type()?;
        Ok(format!(
            "{}/shijyo/seido/jishukisei/web-handbook/{}_{}",
            self.base_url, handbook_type.id, handbook_type.name
        ))
    }

    fn harvest(&self) -> Result<Harvest<Link>> {
        let url = self.url()?;
        let html = fetch_html(&self.client, &url)?;
        parse_handbook_links(&html, self.handbook_type()?, &url, &self.base_url)
    }
}
