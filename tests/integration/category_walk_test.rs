// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::http_fetcher;
use cianrs::spiders::category::CategoryWalker;
use std::collections::HashSet;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn walker() -> CategoryWalker {
    CategoryWalker::new(http_fetcher(), "/flat/".to_string(), "p=".to_string())
}

#[tokio::test]
async fn test_pagination_cycle_terminates_and_collects_details() {
    let server = MockServer::start().await;

    // Page two links back to page one; without the visited set this
    // walk would never terminate.
    let page_one = r#"<body>
        <a href="?p=2">следующая</a>
        <a href="/sale/flat/101/">квартира 101</a>
        <a href="https://external.example/sale/flat/777/">чужой хост</a>
    </body>"#;
    let page_two = r#"<body>
        <a href="/kupit-kvartiru/">первая</a>
        <a href="?p=2">текущая</a>
        <a href="/sale/flat/102/">квартира 102</a>
        <a href="/sale/flat/101/">квартира 101 ещё раз</a>
    </body>"#;

    Mock::given(method("GET"))
        .and(path("/kupit-kvartiru/"))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_two))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/kupit-kvartiru/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_one))
        .mount(&server)
        .await;

    let start = format!("{}/kupit-kvartiru/", server.uri());
    let details = walker().walk(&start).await;

    let unique: HashSet<String> = details.iter().cloned().collect();
    assert_eq!(details.len(), unique.len(), "details are deduplicated");
    assert_eq!(
        unique,
        HashSet::from([
            format!("{}/sale/flat/101/", server.uri()),
            format!("{}/sale/flat/102/", server.uri()),
        ])
    );
}

#[tokio::test]
async fn test_non_detail_links_expand_as_categories() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nedvizhimost/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<body><a href="/kupit-kvartiru-1-komnatnaya/">однокомнатные</a></body>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/kupit-kvartiru-1-komnatnaya/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<body><a href="/sale/flat/5/">квартира</a></body>"#),
        )
        .mount(&server)
        .await;

    let start = format!("{}/nedvizhimost/", server.uri());
    let details = walker().walk(&start).await;

    assert_eq!(details, vec![format!("{}/sale/flat/5/", server.uri())]);
}

#[tokio::test]
async fn test_failed_page_fetch_skips_subtree() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nedvizhimost/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<body>
                <a href="/broken/">сломанная ветка</a>
                <a href="/sale/flat/6/">квартира</a>
            </body>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let start = format!("{}/nedvizhimost/", server.uri());
    let details = walker().walk(&start).await;

    assert_eq!(details, vec![format!("{}/sale/flat/6/", server.uri())]);
}
