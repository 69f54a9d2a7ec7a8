//! Daiwa Institute of Research reports.
//!
//! A yearly listing links to one page per report; each report page carries
//! a single PDF download button.

use reqwest::blocking::Client;
use scraper::Html;
use strum::{Display, EnumString};

use super::Source;
use crate::config::DIR_BASE_URL;
use crate::error::{HarvesterError, Result};
use crate::html::{href, select_all};
use crate::http::fetch_html;
use crate::link::{Link, LinkDetails};
use crate::loader::{Harvest, Loader};
use crate::uri::resolve_url;

const PDF_BUTTON: &str =
    "div#contents div.wrp-main-inner div.mod-btn-file.-left.-reportPdf.-emphasis a";

/// Report sections of the research site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DirKeyword {
    PolicyAnalysis,
    Economics,
    CapitalMkt,
    LawResearch,
    Introduction,
}

/// Subsections of the law research section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DirSubKeyword {
    Securities,
    LawOthers,
    Tax,
}

/// Report pages linked from a yearly listing.
pub fn parse_report_site_links(
    html: &str,
    base_url: &str,
    keyword: DirKeyword,
    sub_keyword: DirSubKeyword,
) -> Result<Harvest<Link>> {
    let document = Html::parse_document(html);
    let rows = select_all(&document, "#main div li a.c-newsList-link")?
        .into_iter()
        .map(|a| -> Result<Link> {
            let target = href(a).ok_or_else(|| HarvesterError::missing("href", "report anchor"))?;
            let details = LinkDetails::DirReportSite {
                keyword: keyword.to_string(),
                sub_keyword: sub_keyword.to_string(),
            };
            Ok(Link::new(resolve_url(target, base_url), details))
        });
    Ok(Harvest::from_rows("report", rows))
}

/// Resolved target of a report page's PDF button.
pub fn parse_report_pdf(html: &str, base_url: &str) -> Result<String> {
    let document = Html::parse_document(html);
    select_all(&document, PDF_BUTTON)?
        .into_iter()
        .find_map(href)
        .map(|target| resolve_url(target, base_url))
        .ok_or_else(|| HarvesterError::missing("PDF button", "report page"))
}

/// Loader for the reports of one section and year.
pub struct DirReportLoader {
    client: Client,
    base_url: String,
    keyword: String,
    sub_keyword: String,
    year: i32,
}

impl DirReportLoader {
    pub fn new(
        client: Client,
        keyword: impl Into<String>,
        sub_keyword: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            client,
            base_url: DIR_BASE_URL.to_string(),
            keyword: keyword.into(),
            sub_keyword: sub_keyword.into(),
            year,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Report section; only law research is supported.
    pub fn keyword(&self) -> Result<DirKeyword> {
        let keyword: DirKeyword = self.keyword.parse().map_err(|_| {
            HarvesterError::invalid_config(
                "keyword",
                &self.keyword,
                "policy-analysis, economics, capital-mkt, law-research or introduction",
            )
        })?;
        if keyword != DirKeyword::LawResearch {
            return Err(HarvesterError::Unsupported(
                "Only law-research is supported.".to_string(),
            ));
        }
        Ok(keyword)
    }

    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
    }

    pub fn sub_keyword(&self) -> Result<DirSubKeyword> {
        self.sub_keyword.parse().map_err(|_| {
            HarvesterError::invalid_config(
                "sub keyword",
                &self.sub_keyword,
                "securities, law-others or tax",
            )
        })
    }

    pub fn set_sub_keyword(&mut self, sub_keyword: impl Into<String>) {
        self.sub_keyword = sub_keyword.into();
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn set_year(&mut self, year: i32) {
        self.year = year;
    }

    /// Report pages of the configured listing.
    pub fn report_site_links(&self) -> Result<Harvest<Link>> {
        let html = fetch_html(&self.client, &self.url()?)?;
        parse_report_site_links(&html, &self.base_url, self.keyword()?, self.sub_keyword()?)
    }

    /// The PDF link of one report page, keeping its keywords.
    pub fn pdf_link(&self, site_link: &Link) -> Result<Link> {
        let LinkDetails::DirReportSite {
            keyword,
            sub_keyword,
        } = &site_link.details
        else {
            return Err(HarvesterError::UnexpectedLink(site_link.url.clone()));
        };

        let html = fetch_html(&self.client, &site_link.url)?;
        let url = parse_report_pdf(&html, &self.base_url)?;
        Ok(Link::new(
            url,
            LinkDetails::DirReport {
                keyword: keyword.clone(),
                sub_keyword: sub_keyword.clone(),
            },
        ))
    }
}

impl Loader for DirReportLoader {
    fn source(&self) -> Source {
        Source::DirReport
    }

    fn url(&self) -> Result<String> {
        Ok(format!(
            "{}/report/research/{}/{}/{}.html",
            self.base_url,
            self.keyword()?,
            self.sub_keyword()?,
            self.year
        ))
    }

    fn harvest(&self) -> Result<Harvest<Link>> {
        let sites = self.report_site_links()?;
        let mut harvest = Harvest {
            items: Vec::new(),
            warnings: sites.warnings,
        };
        for site in &sites.items {
            match self.pdf_link(site) {
                Ok(link) => harvest.push(link),
                Err(e) => harvest.skip(format!("report {}", site.url), e),
            }
        }
        Ok(harvest)
    }
}
