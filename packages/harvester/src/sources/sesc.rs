//! Securities and Exchange Surveillance Commission: press releases (houdou)
//! and case studies (jirei). Both live on the FSA host.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::Client;
use scraper::Html;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::Source;
use crate::config::{validate_year_in, FSA_BASE_URL};
use crate::error::{HarvesterError, Result};
use crate::html::{element_text, href, select_all, select_first_in};
use crate::http::fetch_html;
use crate::link::{Link, LinkDetails, MediaType};
use crate::loader::{Harvest, Loader};
use crate::uri::resolve_url;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").expect("valid regex"));

/// Press release categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SescHoudouCategory {
    Kinshou,
    Hukousei,
    Kaiji,
    Others,
}

impl SescHoudouCategory {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kinshou => "金融商品取引業関係",
            Self::Hukousei => "不公正取引関係",
            Self::Kaiji => "開示規制違反関係",
            Self::Others => "年次公表等",
        }
    }
}

/// Years listed on the press release index, one per `h3.layout-3` heading.
pub fn parse_sesc_available_years(html: &str) -> Result<Vec<i32>> {
    let document = Html::parse_document(html);
    Ok(select_all(&document, "h3.layout-3")?
        .into_iter()
        .filter_map(|h3| {
            YEAR.find(&element_text(h3))
                .and_then(|m| m.as_str().parse::<i32>().ok())
        })
        .collect())
}

/// Parse a yearly press release list; the item text becomes the description.
pub fn parse_houdou_links(
    html: &str,
    base_url: &str,
    year: i32,
    category: SescHoudouCategory,
) -> Result<Harvest<Link>> {
    let document = Html::parse_document(html);
    let rows = select_all(&document, "div#main li")?.into_iter().map(|li| -> Result<Link> {
        let target = select_first_in(li, "a")?
            .and_then(href)
            .ok_or_else(|| HarvesterError::missing("a[href]", "press release item"))?;
        let details = LinkDetails::SescHoudou {
            yyyy: year,
            houdou_category: category.to_string(),
        };
        Ok(Link::new(resolve_url(target, base_url), details)
            .with_description(element_text(li).trim()))
    });
    Ok(Harvest::from_rows("press release", rows))
}

/// Loader for the SESC press releases of one year and category.
///
/// The available years are read from the index page when the loader is
/// built; year and category are validated when the URL is requested.
pub struct SescHoudouLoader {
    client: Client,
    base_url: String,
    year: i32,
    category: String,
    years: Vec<i32>,
}

impl SescHoudouLoader {
    /// Build a loader, fetching the list of available years.
    pub fn new(client: Client, year: i32, category: impl Into<String>) -> Result<Self> {
        Self::with_base_url(client, FSA_BASE_URL, year, category)
    }

    pub fn with_base_url(
        client: Client,
        base_url: impl Into<String>,
        year: i32,
        category: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into();
        let index = fetch_html(&client, &format!("{base_url}/sesc/houdou"))?;
        let years = parse_sesc_available_years(&index)?;
        tracing::debug!(?years, "SESC press release years");
        Ok(Self::from_parts(client, base_url, year, category, years))
    }

    /// Build a loader from an already known list of years.
    pub fn from_parts(
        client: Client,
        base_url: impl Into<String>,
        year: i32,
        category: impl Into<String>,
        years: Vec<i32>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            year,
            category: category.into(),
            years,
        }
    }

    pub fn available_years(&self) -> &[i32] {
        &self.years
    }

    /// Target year, validated against the available years.
    pub fn year(&self) -> Result<i32> {
        validate_year_in(self.year, &self.years)
    }

    pub fn set_year(&mut self, year: i32) {
        self.year = year;
    }

    /// Target category, validated.
    pub fn category(&self) -> Result<SescHoudouCategory> {
        self.category.parse().map_err(|_| {
            let names: Vec<String> = SescHoudouCategory::iter().map(|c| c.to_string()).collect();
            HarvesterError::invalid_config(
                "category",
                &self.category,
                format!("one of {}", names.join(", ")),
            )
        })
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }
}

impl Loader for SescHoudouLoader {
    fn source(&self) -> Source {
        Source::SescHoudou
    }

    fn url(&self) -> Result<String> {
        Ok(format!(
            "{}/sesc/houdou/{}{}.html",
            self.base_url,
            self.year()?,
            self.category()?
        ))
    }

    fn harvest(&self) -> Result<Harvest<Link>> {
        let html = fetch_html(&self.client, &self.url()?)?;
        parse_houdou_links(&html, &self.base_url, self.year()?, self.category()?)
    }
}

/// Title and raw target of every case on the case study index.
pub fn parse_jirei_index(html: &str) -> Result<Harvest<(String, String)>> {
    let document = Html::parse_document(html);
    let rows = select_all(&document, "div#main div.inner li a")?
        .into_iter()
        .map(|a| -> Result<(String, String)> {
            let target = href(a).ok_or_else(|| HarvesterError::missing("href", "case anchor"))?;
            Ok((element_text(a).trim().to_string(), target.to_string()))
        });
    Ok(Harvest::from_rows("case", rows))
}

/// Resolved target of the first document anchor of a case detail page.
pub fn parse_jirei_detail(html: &str, base_url: &str) -> Result<String> {
    let document = Html::parse_document(html);
    select_all(&document, "div#main div.inner p.indent:first-child a")?
        .into_iter()
        .find_map(href)
        .map(|target| resolve_url(target, base_url))
        .ok_or_else(|| HarvesterError::missing("p.indent a", "case detail page"))
}

/// Loader for the SESC case study index.
pub struct SescJireiLoader {
    client: Client,
    base_url: String,
}

impl SescJireiLoader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: FSA_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn case_link(&self, title: &str, target: &str) -> Result<Link> {
        let details = LinkDetails::SescJirei {
            title: title.to_string(),
        };
        let url = resolve_url(target, &self.base_url);
        match MediaType::from_target(target)? {
            MediaType::Pdf => Ok(Link::new(url, details)),
            MediaType::Html => {
                let detail = fetch_html(&self.client, &url)?;
                Ok(Link::new(parse_jirei_detail(&detail, &self.base_url)?, details))
            }
            _ => Err(HarvesterError::UnexpectedLink(target.to_string())),
        }
    }
}

impl Loader for SescJireiLoader {
    fn source(&self) -> Source {
        Source::SescJirei
    }

    fn url(&self) -> Result<String> {
        Ok(format!("{}/sesc/jirei/index.html", self.base_url))
    }

    /// A target that is neither a page nor a PDF aborts the harvest; a
    /// detail page that cannot be fetched or parsed is skipped.
    fn harvest(&self) -> Result<Harvest<Link>> {
        let index = parse_jirei_index(&fetch_html(&self.client, &self.url()?)?)?;
        let mut harvest = Harvest {
            items: Vec::new(),
            warnings: index.warnings,
        };
        for (title, target) in &index.items {
            match self.case_link(title, target) {
                Ok(link) => harvest.push(link),
                Err(e @ HarvesterError::UnexpectedLink(_)) => return Err(e),
                Err(e) => harvest.skip(format!("case '{title}'"), e),
            }
        }
        Ok(harvest)
    }
}
