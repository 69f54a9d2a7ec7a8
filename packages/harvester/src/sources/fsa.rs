//! Financial Services Agency: public comments and news releases.

use reqwest::blocking::Client;
use scraper::{ElementRef, Html};

use super::{pdf_links, Source};
use crate::config::{validate_year_range, FSA_BASE_URL};
use crate::error::{HarvesterError, Result};
use crate::html::{element_text, href, select_all, select_first_in};
use crate::http::{fetch_html, probe};
use crate::link::{Link, LinkDetails, ProjectRef};
use crate::loader::{Harvest, Loader};
use crate::uri::resolve_url;

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

/// One row of the yearly public comment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsaPublicComment {
    /// Publication date (公表日).
    pub date: String,
    /// Project title (案件名).
    pub project_name: String,
    pub project_url: Option<String>,
    /// Comment deadline (締め切り日).
    pub deadline: String,
    /// Remarks (備考).
    pub note: String,
    pub note_url: Option<String>,
}

/// Text of a cell and the resolved target of its first anchor, if any.
fn cell(td: ElementRef<'_>, base_url: &str) -> Result<(String, Option<String>)> {
    match select_first_in(td, "a")? {
        Some(a) => Ok((
            element_text(a).trim().to_string(),
            href(a).map(|h| resolve_url(h, base_url)),
        )),
        None => Ok((element_text(td).trim().to_string(), None)),
    }
}

/// Parse the rows of a yearly public comment page.
///
/// A row with fewer than four cells is skipped with a warning.
pub fn parse_fsa_public_comments(html: &str, base_url: &str) -> Result<Harvest<FsaPublicComment>> {
    let document = Html::parse_document(html);
    let td = crate::html::selector("td")?;

    let rows = select_all(&document, "div#main tbody tr")?.into_iter().map(|tr| {
        let tds: Vec<ElementRef<'_>> = tr.select(&td).collect();
        let [date, project, deadline, note, ..] = tds.as_slice() else {
            return Err(HarvesterError::missing(format!("td[{}]", tds.len()), "public comment row"));
        };
        let (project_name, project_url) = cell(*project, base_url)?;
        let (note, note_url) = cell(*note, base_url)?;
        Ok(FsaPublicComment {
            date: element_text(*date).trim().to_string(),
            project_name,
            project_url,
            deadline: element_text(*deadline).trim().to_string(),
            note,
            note_url,
        })
    });

    Ok(Harvest::from_rows("row", rows))
}

/// Loader for the FSA public comment list of one year.
pub struct FsaPublicCommentLoader {
    client: Client,
    base_url: String,
    year: i32,
}

impl FsaPublicCommentLoader {
    pub fn new(client: Client, year: i32) -> Self {
        Self {
            client,
            base_url: FSA_BASE_URL.to_string(),
            year,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Target year, validated to lie in 2000..=2100.
    pub fn year(&self) -> Result<i32> {
        validate_year_range(self.year, MIN_YEAR, MAX_YEAR)
    }

    pub fn set_year(&mut self, year: i32) {
        self.year = year;
    }

    /// Rows of the yearly table.
    pub fn public_comments(&self) -> Result<Harvest<FsaPublicComment>> {
        let html = fetch_html(&self.client, &self.url()?)?;
        parse_fsa_public_comments(&html, &self.base_url)
    }

    /// PDF links of one project page.
    pub fn links_for(&self, comment: &FsaPublicComment) -> Result<Vec<Link>> {
        let project_url = comment
            .project_url
            .as_deref()
            .ok_or_else(|| HarvesterError::missing("project link", comment.project_name.clone()))?;

        let document = Html::parse_document(&fetch_html(&self.client, project_url)?);
        pdf_links(&document, &self.base_url, |url| {
            Link::new(
                url,
                LinkDetails::FsaPublicComment(ProjectRef {
                    publish_date: comment.date.clone(),
                    project_name: comment.project_name.clone(),
                }),
            )
        })
    }
}

impl Loader for FsaPublicCommentLoader {
    fn source(&self) -> Source {
        Source::FsaPublicComment
    }

    fn url(&self) -> Result<String> {
        Ok(format!("{}/public/{}.html", self.base_url, self.year()?))
    }

    fn harvest(&self) -> Result<Harvest<Link>> {
        let comments = self.public_comments()?;
        let mut harvest = Harvest {
            items: Vec::new(),
            warnings: comments.warnings,
        };
        for comment in &comments.items {
            match self.links_for(comment) {
                Ok(links) => harvest.items.extend(links),
                Err(e) => harvest.skip(format!("project '{}'", comment.project_name), e),
            }
        }
        Ok(harvest)
    }
}

/// Japanese era year used in FSA news URLs.
///
/// Reiwa years (2019 onward) are prefixed with `r`; earlier years are Heisei
/// years without a prefix.
///
/// # Examples
/// ```
/// use legaldata_harvester::sources::era_year;
///
/// assert_eq!(era_year(2024), "r6");
/// assert_eq!(era_year(2018), "30");
/// ```
#[must_use]
pub fn era_year(year: i32) -> String {
    if year >= 2019 {
        format!("r{}", year - 2018)
    } else {
        (year - 1988).to_string()
    }
}

/// Parse a news menu page; the anchor text becomes the description.
pub fn parse_news_links(html: &str, base_url: &str, year: i32) -> Result<Harvest<Link>> {
    let document = Html::parse_document(html);
    let rows = select_all(&document, "div#main div.inner ul li a")?
        .into_iter()
        .map(|a| {
            let target = href(a).ok_or_else(|| HarvesterError::missing("href", "news anchor"))?;
            Ok(Link::new(resolve_url(target, base_url), LinkDetails::FsaNews { year })
                .with_description(element_text(a).trim()))
        });
    Ok(Harvest::from_rows("news item", rows))
}

/// Loader for the FSA news menu of one year.
pub struct FsaNewsLoader {
    client: Client,
    base_url: String,
    year: i32,
}

impl FsaNewsLoader {
    pub fn new(client: Client, year: i32) -> Self {
        Self {
            client,
            base_url: FSA_BASE_URL.to_string(),
            year,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn set_year(&mut self, year: i32) {
        self.year = year;
    }
}

impl Loader for FsaNewsLoader {
    fn source(&self) -> Source {
        Source::FsaNews
    }

    /// The yearly news menu, or the news index when that menu is missing.
    fn url(&self) -> Result<String> {
        let menu = format!("{}/news/{}_news_menu.html", self.base_url, era_year(self.year));
        if probe(&self.client, &menu)? {
            Ok(menu)
        } else {
            tracing::debug!(url = %menu, "News menu missing, using news index");
            Ok(format!("{}/news/index.html", self.base_url))
        }
    }

    fn harvest(&self) -> Result<Harvest<Link>> {
        let html = fetch_html(&self.client, &self.url()?)?;
        parse_news_links(&html, &self.base_url, self.year)
    }
}
