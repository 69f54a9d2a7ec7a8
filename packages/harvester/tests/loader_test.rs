//! Site loaders end to end against a local mock of each site.

mod common;

use common::{blocking, serve_html, serve_status};
use legaldata_harvester::link::{LawEntry, ProjectRef};
use legaldata_harvester::sources::{
    DirReportLoader, FsaNewsLoader, FsaPublicCommentLoader, JpxPublicCommentLoader,
    SescHoudouLoader, SescJireiLoader,
};
use legaldata_harvester::{
    build_loader, HarvesterError, LinkDetails, Loader, LoaderOptions, MediaType, Source,
};
use pretty_assertions::assert_eq;
use wiremock::MockServer;

#[tokio::test]
async fn test_egov_law_list() {
    let server = MockServer::start().await;
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<DataRoot><Result><Code>0</Code></Result><ApplData><Category>2</Category>
<LawNameListInfo><LawId>323AC0000000025</LawId><LawName>金融商品取引法</LawName><LawNo>昭和二十三年法律第二十五号</LawNo><PromulgationDate>19480413</PromulgationDate></LawNameListInfo>
</ApplData></DataRoot>"#;
    serve_html(&server, "/api/1/lawlists/2", xml).await;

    let base = server.uri();
    let (links, names) = blocking(move |client| {
        let options = LoaderOptions {
            category: Some("2".to_string()),
            base_url: Some(base),
            ..LoaderOptions::default()
        };
        let loader = build_loader(&client, Source::Egov, &options).unwrap();
        let links = loader.get_links().unwrap();

        let egov = legaldata_harvester::sources::EgovLoader::new(client, "2")
            .with_base_url(options.base_url.unwrap_or_default());
        (links, egov.law_names().unwrap())
    })
    .await;

    assert_eq!(links.len(), 1);
    assert!(links[0]
        .url
        .ends_with("/api/1/lawdata/昭和二十三年法律第二十五号"));
    assert_eq!(links[0].media_type, MediaType::Xml);
    assert_eq!(
        links[0].details,
        LinkDetails::Egov(LawEntry {
            law_id: "323AC0000000025".to_string(),
            law_name: "金融商品取引法".to_string(),
            law_number: "昭和二十三年法律第二十五号".to_string(),
            promulgation_date: "19480413".to_string(),
        })
    );
    assert_eq!(
        names.get("金融商品取引法").map(String::as_str),
        Some("昭和二十三年法律第二十五号")
    );
}

#[tokio::test]
async fn test_fsa_public_comment_tolerates_bad_rows() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/public/2024.html",
        r#"<div id="main"><table><tbody>
<tr><td>2024年1月10日</td><td><a href="/news/r5/a.html">施行令の改正案</a></td><td>2024年2月9日</td><td>結果公示</td></tr>
<tr><td>壊れた行</td></tr>
<tr><td>2024年1月20日</td><td><a href="/news/r5/gone.html">取り下げ案件</a></td><td>-</td><td>-</td></tr>
<tr><td>2024年1月30日</td><td>資料なし</td><td>-</td><td>-</td></tr>
</tbody></table></div>"#,
    )
    .await;
    serve_html(
        &server,
        "/news/r5/a.html",
        r#"<a href="/news/r5/a/01.pdf">概要</a><a href="./02.pdf">本文</a><a href="/news/r5/b.html">関連</a>"#,
    )
    .await;
    serve_status(&server, "/news/r5/gone.html", 404).await;

    let base = server.uri();
    let expected_base = base.clone();
    let harvest = blocking(move |client| {
        FsaPublicCommentLoader::new(client, 2024)
            .with_base_url(base)
            .harvest()
            .unwrap()
    })
    .await;

    let urls: Vec<&str> = harvest.items.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{expected_base}/news/r5/a/01.pdf"),
            format!("{expected_base}/02.pdf"),
        ]
    );
    assert_eq!(
        harvest.items[0].details,
        LinkDetails::FsaPublicComment(ProjectRef {
            publish_date: "2024年1月10日".to_string(),
            project_name: "施行令の改正案".to_string(),
        })
    );
    // Short row, failed project page, row without a project link
    assert_eq!(harvest.warning_count(), 3);
}

#[tokio::test]
async fn test_fsa_news_falls_back_to_index() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/news/index.html",
        r#"<div id="main"><div class="inner"><ul><li><a href="/news/r6/a.html">お知らせ</a></li></ul></div></div>"#,
    )
    .await;

    let base = server.uri();
    let expected = format!("{base}/news/index.html");
    let (url, links) = blocking(move |client| {
        let loader = FsaNewsLoader::new(client, 2024).with_base_url(base);
        (loader.url().unwrap(), loader.get_links().unwrap())
    })
    .await;

    assert_eq!(url, expected);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].description, "お知らせ");
}

#[tokio::test]
async fn test_sesc_houdou_reads_available_years() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/sesc/houdou",
        r#"<h3 class="layout-3">2024年</h3><h3 class="layout-3">2023年</h3>"#,
    )
    .await;
    serve_html(
        &server,
        "/sesc/houdou/2023kaiji.html",
        r#"<div id="main"><ul><li><a href="/sesc/news/c_2023/2023/20231201-1.html">開示検査の結果</a></li></ul></div>"#,
    )
    .await;

    let base = server.uri();
    let (years, links, bad_year) = blocking(move |client| {
        let mut loader = SescHoudouLoader::with_base_url(client, base, 2023, "kaiji").unwrap();
        let years = loader.available_years().to_vec();
        let links = loader.get_links().unwrap();
        loader.set_year(2001);
        (years, links, loader.get_links().unwrap_err())
    })
    .await;

    assert_eq!(years, vec![2024, 2023]);
    assert_eq!(links.len(), 1);
    assert_eq!(
        links[0].details,
        LinkDetails::SescHoudou {
            yyyy: 2023,
            houdou_category: "kaiji".to_string(),
        }
    );
    assert!(matches!(bad_year, HarvesterError::InvalidConfig { field: "year", .. }));
}

#[tokio::test]
async fn test_sesc_jirei_follows_detail_pages() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/sesc/jirei/index.html",
        r#"<div id="main"><div class="inner"><ul>
<li><a href="/sesc/jirei/torihiki.html">取引調査事例集</a></li>
<li><a href="/sesc/jirei/kensa.pdf">検査事例集</a></li>
<li><a href="/sesc/jirei/missing.html">削除済み</a></li>
</ul></div></div>"#,
    )
    .await;
    serve_html(
        &server,
        "/sesc/jirei/torihiki.html",
        r#"<div id="main"><div class="inner"><p class="indent"><a href="/sesc/jirei/torihiki/01.pdf">本文</a></p></div></div>"#,
    )
    .await;
    serve_status(&server, "/sesc/jirei/missing.html", 404).await;

    let base = server.uri();
    let expected_base = base.clone();
    let harvest =
        blocking(move |client| SescJireiLoader::new(client).with_base_url(base).harvest().unwrap())
            .await;

    assert_eq!(harvest.items.len(), 2);
    assert_eq!(
        harvest.items[0].url,
        format!("{expected_base}/sesc/jirei/torihiki/01.pdf")
    );
    assert_eq!(
        harvest.items[0].details,
        LinkDetails::SescJirei {
            title: "取引調査事例集".to_string(),
        }
    );
    assert_eq!(
        harvest.items[1].url,
        format!("{expected_base}/sesc/jirei/kensa.pdf")
    );
    assert_eq!(harvest.warning_count(), 1);
}

#[tokio::test]
async fn test_sesc_jirei_unexpected_target_is_fatal() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/sesc/jirei/index.html",
        r#"<div id="main"><div class="inner"><ul>
<li><a href="/sesc/jirei/kensa.pdf">検査事例集</a></li>
<li><a href="/sesc/jirei/list.xlsx">一覧表</a></li>
</ul></div></div>"#,
    )
    .await;

    let base = server.uri();
    let err = blocking(move |client| {
        SescJireiLoader::new(client)
            .with_base_url(base)
            .get_links()
            .unwrap_err()
    })
    .await;

    assert_eq!(err.to_string(), "Unexpected link: /sesc/jirei/list.xlsx");
}

#[tokio::test]
async fn test_jpx_public_comment_archive_year() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/rules-participants/public-comment/",
        "<select class=\"backnumber\">\n<option>2024年</option><option>2023年</option>\n</select>",
    )
    .await;
    serve_html(
        &server,
        "/rules-participants/public-comment/archives-01.html",
        r#"<div class="component-normal-table"><table>
<tr><th>公表日</th><th>締切日</th><th>法人名</th><th>案件名</th></tr>
<tr><td>2023/06/01</td><td>2023/06/30</td><td>東京証券取引所</td><td><a href="/rules-participants/public-comment/detail/d1/20230601.html">上場制度の見直し</a></td></tr>
</table></div>"#,
    )
    .await;
    serve_html(
        &server,
        "/rules-participants/public-comment/detail/d1/20230601.html",
        r#"<a href="/rules-participants/public-comment/detail/d1/20230601-01.pdf">概要</a>"#,
    )
    .await;

    let base = server.uri();
    let expected_base = base.clone();
    let (url, links) = blocking(move |client| {
        let loader = JpxPublicCommentLoader::with_base_url(client, base, 2023).unwrap();
        (loader.url().unwrap(), loader.get_links().unwrap())
    })
    .await;

    assert_eq!(
        url,
        format!("{expected_base}/rules-participants/public-comment/archives-01.html")
    );
    assert_eq!(links.len(), 1);
    assert_eq!(
        links[0].url,
        format!("{expected_base}/rules-participants/public-comment/detail/d1/20230601-01.pdf")
    );
    assert_eq!(
        links[0].details,
        LinkDetails::JpxPublicComment(ProjectRef {
            publish_date: "2023/06/01".to_string(),
            project_name: "上場制度の見直し".to_string(),
        })
    );
}

#[tokio::test]
async fn test_jpx_rule_and_jsda_use_custom_url() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/rule",
        r#"<dl><dd><a href="teikan.html">定款</a></dd></dl>"#,
    )
    .await;
    serve_html(
        &server,
        "/about/kisoku",
        r#"<a href="files/teikan.pdf">定款</a><a href="files/index.html">一覧</a>"#,
    )
    .await;

    let base = server.uri();
    let expected_base = base.clone();
    let (rules, jsda) = blocking(move |client| {
        let rule_options = LoaderOptions {
            url: Some(format!("{base}/rule")),
            ..LoaderOptions::default()
        };
        let jsda_options = LoaderOptions {
            base_url: Some(base),
            ..LoaderOptions::default()
        };
        (
            build_loader(&client, Source::JpxRule, &rule_options)
                .unwrap()
                .get_links()
                .unwrap(),
            build_loader(&client, Source::Jsda, &jsda_options)
                .unwrap()
                .get_links()
                .unwrap(),
        )
    })
    .await;

    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].url, format!("{expected_base}/rule/teikan.html"));
    assert_eq!(jsda.len(), 1);
    assert_eq!(
        jsda[0].url,
        format!("{expected_base}/about/kisoku/files/teikan.pdf")
    );
}

#[tokio::test]
async fn test_dir_report_skips_pages_without_pdf() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/report/research/law-research/tax/2024.html",
        r#"<div id="main"><div><ul>
<li><a class="c-newsList-link" href="/report/research/law-research/tax/20240110.html">税制改正</a></li>
<li><a class="c-newsList-link" href="/report/research/law-research/tax/20240220.html">PDFなし</a></li>
</ul></div></div>"#,
    )
    .await;
    serve_html(
        &server,
        "/report/research/law-research/tax/20240110.html",
        r#"<div id="contents"><div class="wrp-main-inner"><div class="mod-btn-file -left -reportPdf -emphasis"><a href="/report/research/law-research/tax/20240110.pdf">PDF</a></div></div></div>"#,
    )
    .await;
    serve_html(
        &server,
        "/report/research/law-research/tax/20240220.html",
        r#"<div id="contents"></div>"#,
    )
    .await;

    let base = server.uri();
    let expected_base = base.clone();
    let harvest = blocking(move |client| {
        DirReportLoader::new(client, "law-research", "tax", 2024)
            .with_base_url(base)
            .harvest()
            .unwrap()
    })
    .await;

    assert_eq!(harvest.items.len(), 1);
    assert_eq!(harvest.warning_count(), 1);
    let link = &harvest.items[0];
    assert_eq!(
        link.url,
        format!("{expected_base}/report/research/law-research/tax/20240110.pdf")
    );
    assert_eq!(link.media_type, MediaType::Pdf);
    assert_eq!(
        link.details,
        LinkDetails::DirReport {
            keyword: "law-research".to_string(),
            sub_keyword: "tax".to_string(),
        }
    );
}
