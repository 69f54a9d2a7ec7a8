//! Japan Exchange Group: the rule book (jpx-gr.info) and public comments.

use reqwest::blocking::Client;
use scraper::{ElementRef, Html};

use super::{pdf_links, Source};
use crate::config::{validate_year_in, JPX_BASE_URL, JPX_RULES_URL};
use crate::error::{HarvesterError, Result};
use crate::html::{element_text, href, select_all, select_first_in, selector};
use crate::http::fetch_html;
use crate::link::{Link, LinkDetails, ProjectRef};
use crate::loader::{Harvest, Loader};
use crate::uri::resolve_url;

/// Parse the rule book index: every anchor inside a `dd`.
pub fn parse_rule_links(html: &str, url: &str) -> Result<Harvest<Link>> {
    let document = Html::parse_document(html);
    let rows = select_all(&document, "dd a")?.into_iter().map(|a| -> Result<Link> {
        let target = href(a).ok_or_else(|| HarvesterError::missing("href", "rule anchor"))?;
        Ok(Link::new(resolve_url(target, url), LinkDetails::JpxRule))
    });
    Ok(Harvest::from_rows("rule", rows))
}

/// Loader for the JPX rule book.
pub struct JpxRuleLoader {
    client: Client,
    url: String,
}

impl JpxRuleLoader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: JPX_RULES_URL.to_string(),
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }
}

impl Loader for JpxRuleLoader {
    fn source(&self) -> Source {
        Source::JpxRule
    }

    fn url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    fn harvest(&self) -> Result<Harvest<Link>> {
        let html = fetch_html(&self.client, &self.url)?;
        parse_rule_links(&html, &self.url)
    }
}

/// One row of a yearly JPX public comment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpxPublicComment {
    /// Publication date (公表日).
    pub date: String,
    /// Project title (案件名).
    pub project_name: String,
    pub project_url: String,
    /// Comment deadline (締め切り日); only in four-column tables.
    pub deadline: Option<String>,
    /// Corporation name (法人名) with all whitespace removed; only in
    /// four-column tables.
    pub corporation: Option<String>,
}

/// Years offered by the back number selector of the public comment index.
///
/// The selector text lists the years on its second line, e.g.
/// `2024年2023年2022年`.
pub fn parse_jpx_available_years(html: &str) -> Result<Vec<i32>> {
    let document = Html::parse_document(html);
    let select = select_all(&document, "select.backnumber")?
        .into_iter()
        .next()
        .ok_or_else(|| HarvesterError::missing("select.backnumber", "public comment index"))?;

    let text = element_text(select);
    let line = text
        .split('\n')
        .nth(1)
        .ok_or_else(|| HarvesterError::missing("year list", "select.backnumber"))?;

    line.split('年')
        .map(str::trim)
        .filter(|year| !year.is_empty())
        .map(|year| {
            year.parse::<i32>()
                .map_err(|_| HarvesterError::missing(format!("year in '{year}'"), "select.backnumber"))
        })
        .collect()
}

/// Page name of a year: the newest year is `index`, older ones are
/// numbered archives counting back from it.
///
/// # Examples
/// ```
/// use legaldata_harvester::sources::year_to_index;
///
/// assert_eq!(year_to_index(2024, 2024), "index");
/// assert_eq!(year_to_index(2021, 2024), "archives-03");
/// ```
#[must_use]
pub fn year_to_index(year: i32, max_year: i32) -> String {
    if year == max_year {
        "index".to_string()
    } else {
        format!("archives-{:02}", max_year - year)
    }
}

fn cell_text(td: ElementRef<'_>) -> String {
    element_text(td).trim().to_string()
}

fn project_url(td: ElementRef<'_>, base_url: &str) -> Result<String> {
    select_first_in(td, "a")?
        .and_then(href)
        .map(|target| resolve_url(target, base_url))
        .ok_or_else(|| HarvesterError::missing("a[href]", "project cell"))
}

fn four_column_row(tds: &[ElementRef<'_>], base_url: &str) -> Result<JpxPublicComment> {
    let [date, deadline, corporation, project, ..] = tds else {
        return Err(HarvesterError::missing(format!("td[{}]", tds.len()), "4-column row"));
    };
    let corporation: String = element_text(*corporation)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    Ok(JpxPublicComment {
        date: cell_text(*date),
        project_name: cell_text(*project),
        project_url: project_url(*project, base_url)?,
        deadline: Some(cell_text(*deadline)),
        corporation: Some(corporation),
    })
}

fn two_column_row(tds: &[ElementRef<'_>], base_url: &str) -> Result<JpxPublicComment> {
    let [date, project, ..] = tds else {
        return Err(HarvesterError::missing(format!("td[{}]", tds.len()), "2-column row"));
    };
    Ok(JpxPublicComment {
        date: cell_text(*date),
        project_name: cell_text(*project),
        project_url: project_url(*project, base_url)?,
        deadline: None,
        corporation: None,
    })
}

/// Parse a yearly public comment table.
///
/// The layout is chosen by the number of `th` cells: four columns (date,
/// deadline, corporation, project) or two (date, project). Rows without
/// `td` cells are headers. Any other layout yields no rows and a warning.
pub fn parse_jpx_public_comments(
    html: &str,
    base_url: &str,
) -> Result<Harvest<JpxPublicComment>> {
    let document = Html::parse_document(html);
    let table = select_all(&document, "div.component-normal-table table")?
        .into_iter()
        .next()
        .ok_or_else(|| HarvesterError::missing("div.component-normal-table table", "page"))?;

    let th = selector("th")?;
    let tr = selector("tr")?;
    let td = selector("td")?;

    let parse_row: fn(&[ElementRef<'_>], &str) -> Result<JpxPublicComment> =
        match table.select(&th).count() {
            4 => four_column_row,
            2 => two_column_row,
            n => {
                let mut harvest = Harvest::new();
                harvest.skip("table", format!("unsupported layout with {n} columns"));
                return Ok(harvest);
            }
        };

    let rows = table
        .select(&tr)
        .map(|row| row.select(&td).collect::<Vec<_>>())
        .filter(|tds| !tds.is_empty())
        .map(|tds| parse_row(&tds, base_url));

    Ok(Harvest::from_rows("row", rows))
}

/// Loader for the JPX public comments of one year.
///
/// The available years are read from the index page when the loader is
/// built; the year is validated when the URL is requested.
pub struct JpxPublicCommentLoader {
    client: Client,
    base_url: String,
    year: i32,
    years: Vec<i32>,
}

impl JpxPublicCommentLoader {
    /// Build a loader, fetching the list of available years.
    pub fn new(client: Client, year: i32) -> Result<Self> {
        Self::with_base_url(client, JPX_BASE_URL, year)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>, year: i32) -> Result<Self> {
        let base_url = base_url.into();
        let index = fetch_html(
            &client,
            &format!("{base_url}/rules-participants/public-comment/"),
        )?;
        let years = parse_jpx_available_years(&index)?;
        tracing::debug!(?years, "JPX public comment years");
        Ok(Self::from_parts(client, base_url, year, years))
    }

    /// Build a loader from an already known list of years.
    pub fn from_parts(
        client: Client,
        base_url: impl Into<String>,
        year: i32,
        years: Vec<i32>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            year,
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

    /// Rows of the yearly table.
    pub fn public_comments(&self) -> Result<Harvest<JpxPublicComment>> {
        let html = fetch_html(&self.client, &self.url()?)?;
        parse_jpx_public_comments(&html, &self.base_url)
    }

    /// PDF links of one project page.
    pub fn links_for(&self, comment: &JpxPublicComment) -> Result<Vec<Link>> {
        let document = Html::parse_document(&fetch_html(&self.client, &comment.project_url)?);
        pdf_links(&document, &self.base_url, |url| {
            Link::new(
                url,
                LinkDetails::JpxPublicComment(ProjectRef {
                    publish_date: comment.date.clone(),
                    project_name: comment.project_name.clone(),
                }),
            )
        })
    }
}

impl Loader for JpxPublicCommentLoader {
    fn source(&self) -> Source {
        Source::JpxPublicComment
    }

    fn url(&self) -> Result<String> {
        let year = self.year()?;
        // `year` is one of `years`, so the list is non-empty
        let max_year = self.years.iter().copied().max().unwrap_or(year);
        Ok(format!(
            "{}/rules-participants/public-comment/{}.html",
            self.base_url,
            year_to_index(year, max_year)
        ))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::http::create_client;
    use pretty_assertions::assert_eq;

    fn loader(year: i32) -> JpxPublicCommentLoader {
        let client = create_client(&FetchConfig::default()).unwrap();
        JpxPublicCommentLoader::from_parts(client, JPX_BASE_URL, year, vec![2024, 2023, 2022])
    }

    #[test]
    fn test_parse_rule_links() {
        let html = r#"<dl><dt>定款</dt>
            <dd><a href="/rule/tosho_regu_201305070007001.html">定款</a></dd>
            <dd><a href="https://jpx-gr.info/rule/other.html">業務規程</a></dd>
        </dl>"#;
        let harvest = parse_rule_links(html, JPX_RULES_URL).unwrap();
        let urls: Vec<&str> = harvest.items.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://jpx-gr.info/rule/tosho_regu_201305070007001.html",
                "https://jpx-gr.info/rule/other.html",
            ]
        );
        assert_eq!(harvest.items[0].category, "JPX");
    }

    #[test]
    fn test_parse_available_years() {
        let html = "<select class=\"backnumber\">\n\
                    <option>2024年</option><option>2023年</option><option>2022年</option>\n\
                    </select>";
        assert_eq!(parse_jpx_available_years(html).unwrap(), vec![2024, 2023, 2022]);
    }

    #[test]
    fn test_parse_available_years_missing_selector() {
        assert!(parse_jpx_available_years("<select></select>").is_err());
    }

    #[test]
    fn test_year_to_index() {
        assert_eq!(year_to_index(2023, 2024), "archives-01");
        assert_eq!(year_to_index(2010, 2024), "archives-14");
    }

    #[test]
    fn test_url_uses_archive_index() {
        assert_eq!(
            loader(2024).url().unwrap(),
            "https://www.jpx.co.jp/rules-participants/public-comment/index.html"
        );
        assert_eq!(
            loader(2022).url().unwrap(),
            "https://www.jpx.co.jp/rules-participants/public-comment/archives-02.html"
        );
        assert!(loader(2006).url().is_err());
    }

    #[test]
    fn test_parse_four_column_table() {
        let html = r#"<div class="component-normal-table"><table>
            <tr><th>公表日</th><th>締切日</th><th>法人名</th><th>案件名</th></tr>
            <tr><td>2024/03/01</td><td>2024/03/31</td><td> 株式会社
                東京証券取引所 </td><td><a href="/rules-participants/public-comment/detail/d1/20240301.html">有価証券上場規程の一部改正</a></td></tr>
            <tr><td>2024/02/01</td><td>2024/02/29</td><td>大阪取引所</td><td>リンクなし</td></tr>
        </table></div>"#;
        let harvest = parse_jpx_public_comments(html, JPX_BASE_URL).unwrap();

        assert_eq!(harvest.items.len(), 1);
        assert_eq!(harvest.warning_count(), 1);
        assert_eq!(
            harvest.items[0],
            JpxPublicComment {
                date: "2024/03/01".to_string(),
                project_name: "有価証券上場規程の一部改正".to_string(),
                project_url:
                    "https://www.jpx.co.jp/rules-participants/public-comment/detail/d1/20240301.html"
                        .to_string(),
                deadline: Some("2024/03/31".to_string()),
                corporation: Some("株式会社東京証券取引所".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_two_column_table() {
        let html = r#"<div class="component-normal-table"><table>
            <thead><tr><th>公表日</th><th>案件名</th></tr></thead>
            <tbody><tr><td>2012/04/01</td><td><a href="/old/20120401.html">旧案件</a></td></tr></tbody>
        </table></div>"#;
        let harvest = parse_jpx_public_comments(html, JPX_BASE_URL).unwrap();
        assert_eq!(harvest.items.len(), 1);
        assert_eq!(harvest.items[0].deadline, None);
        assert_eq!(harvest.items[0].corporation, None);
        assert_eq!(harvest.items[0].project_url, "https://www.jpx.co.jp/old/20120401.html");
    }

    #[test]
    fn test_parse_unsupported_layout() {
        let html = r#"<div class="component-normal-table"><table>
            <tr><th>a</th><th>b</th><th>c</th></tr><tr><td>1</td><td>2</td><td>3</td></tr>
        </table></div>"#;
        let harvest = parse_jpx_public_comments(html, JPX_BASE_URL).unwrap();
        assert!(harvest.items.is_empty());
        assert_eq!(harvest.warning_count(), 1);
    }
}
