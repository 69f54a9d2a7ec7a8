//! Site loaders, one module per publisher.
//!
//! Each loader only uses the fetcher, the URL resolver and its own
//! selection rules. Page parsing lives in free `parse_*` functions taking
//! the page text, so the rules are testable without a network.

mod dir;
mod egov;
mod fsa;
mod jpx;
mod jsda;
mod sesc;

pub use dir::{
    parse_report_pdf, parse_report_site_links, DirKeyword, DirReportLoader, DirSubKeyword,
};
pub use egov::{parse_law_list, parse_raw_text, preprocess_law_text, EgovLoader};
pub use fsa::{
    era_year, parse_fsa_public_comments, parse_news_links, FsaNewsLoader, FsaPublicComment,
    FsaPublicCommentLoader,
};
pub use jpx::{
    parse_jpx_available_years, parse_jpx_public_comments, parse_rule_links, year_to_index,
    JpxPublicComment, JpxPublicCommentLoader, JpxRuleLoader,
};
pub use jsda::{
    handbook_type, handbook_types, parse_handbook_links, parse_jsda_pdf_links, HandbookType,
    JsdaHandbookLoader, JsdaLoader,
};
pub use sesc::{
    parse_houdou_links, parse_jirei_detail, parse_jirei_index, parse_sesc_available_years,
    SescHoudouCategory, SescHoudouLoader, SescJireiLoader,
};

use chrono::Datelike;
use clap::ValueEnum;
use reqwest::blocking::Client;
use strum::Display;

use crate::error::Result;
use crate::link::Link;
use crate::loader::Loader;
use crate::uri::resolve_url;

/// The sites a loader exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Source {
    /// e-Gov law list (elaws.e-gov.go.jp)
    Egov,
    /// FSA public comments
    FsaPublicComment,
    /// FSA news releases
    FsaNews,
    /// SESC press releases (houdou)
    SescHoudou,
    /// SESC case studies (jirei)
    SescJirei,
    /// JPX rule book
    JpxRule,
    /// JPX public comments
    JpxPublicComment,
    /// JSDA association rules
    Jsda,
    /// JSDA self-regulation web handbook
    JsdaHandbook,
    /// Daiwa Institute of Research reports
    DirReport,
}

/// Configuration a caller may pass when building a loader.
///
/// Fields a source does not use are ignored. Values are not validated here;
/// loaders check them when they are used.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    pub year: Option<i32>,
    pub category: Option<String>,
    pub type_id: Option<String>,
    pub keyword: Option<String>,
    pub sub_keyword: Option<String>,
    pub url: Option<String>,
    pub base_url: Option<String>,
}

impl LoaderOptions {
    fn year_or_current(&self) -> i32 {
        self.year.unwrap_or_else(|| chrono::Local::now().year())
    }
}

/// Build the loader for `source`.
///
/// SESC press releases and JPX public comments fetch their list of
/// available years here.
pub fn build_loader(
    client: &Client,
    source: Source,
    options: &LoaderOptions,
) -> Result<Box<dyn Loader>> {
    let client = client.clone();
    let base = options.base_url.clone();
    let year = options.year_or_current();

    let loader: Box<dyn Loader> = match source {
        Source::Egov => {
            let category = options.category.clone().unwrap_or_else(|| "1".to_string());
            let loader = EgovLoader::new(client, category);
            Box::new(with_base(loader, base, |l, b| l.with_base_url(b)))
        }
        Source::FsaPublicComment => {
            let loader = FsaPublicCommentLoader::new(client, year);
            Box::new(with_base(loader, base, |l, b| l.with_base_url(b)))
        }
        Source::FsaNews => {
            let loader = FsaNewsLoader::new(client, year);
            Box::new(with_base(loader, base, |l, b| l.with_base_url(b)))
        }
        Source::SescHoudou => {
            let category = options.category.clone().unwrap_or_else(|| "kinshou".to_string());
            Box::new(match base {
                Some(base) => SescHoudouLoader::with_base_url(client, base, year, category)?,
                None => SescHoudouLoader::new(client, year, category)?,
            })
        }
        Source::SescJirei => {
            let loader = SescJireiLoader::new(client);
            Box::new(with_base(loader, base, |l, b| l.with_base_url(b)))
        }
        Source::JpxRule => {
            let mut loader = JpxRuleLoader::new(client);
            if let Some(url) = options.url.clone().or(base) {
                loader.set_url(url);
            }
            Box::new(loader)
        }
        Source::JpxPublicComment => Box::new(match base {
            Some(base) => JpxPublicCommentLoader::with_base_url(client, base, year)?,
            None => JpxPublicCommentLoader::new(client, year)?,
        }),
        Source::Jsda => {
            let mut loader = JsdaLoader::new(client);
            if let Some(url) = options.url.clone() {
                loader.set_url(url);
            } else if let Some(base) = base {
                loader.set_url(format!("{base}/about/kisoku"));
            }
            Box::new(loader)
        }
        Source::JsdaHandbook => {
            let type_id = options.type_id.clone().unwrap_or_else(|| "101".to_string());
            let loader = JsdaHandbookLoader::new(client, type_id);
            Box::new(with_base(loader, base, |l, b| l.with_base_url(b)))
        }
        Source::DirReport => {
            let keyword = options
                .keyword
                .clone()
                .unwrap_or_else(|| DirKeyword::LawResearch.to_string());
            let sub_keyword = options
                .sub_keyword
                .clone()
                .unwrap_or_else(|| DirSubKeyword::Securities.to_string());
            let loader = DirReportLoader::new(client, keyword, sub_keyword, year);
            Box::new(with_base(loader, base, |l, b| l.with_base_url(b)))
        }
    };

    Ok(loader)
}

fn with_base<L>(loader: L, base: Option<String>, apply: impl FnOnce(L, String) -> L) -> L {
    match base {
        Some(base) => apply(loader, base),
        None => loader,
    }
}

/// Links for every `.pdf` anchor of a page, built with `make`.
pub(crate) fn pdf_links(
    document: &scraper::Html,
    base: &str,
    make: impl Fn(String) -> Link,
) -> Result<Vec<Link>> {
    Ok(crate::html::pdf_hrefs(document)?
        .iter()
        .map(|href| make(resolve_url(href, base)))
        .collect())
}
