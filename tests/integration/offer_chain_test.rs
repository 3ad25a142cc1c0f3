// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::{api_settings, http_fetcher, MemorySink};
use cianrs::domain::record::{FieldValue, RecordKind};
use cianrs::spiders::offers::OffersSpider;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn detail_page(offer_id: &str) -> String {
    format!(
        r#"<html><head>
    <script type="application/ld+json">{{"@type":"Product","image":["https://img.cian.ru/{offer_id}-1.jpg","https://img.cian.ru/{offer_id}-2.jpg"]}}</script>
    <script>window.config = {{"appId": "X123", "pageMother": "offer", "offerId": "{offer_id}", "instance": "ru", "pageType": "offer_card", "pageName": "sale_flat"}};</script>
    </head><body>
    <h1>2-комн. квартира, 54 м²</h1>
    <div data-name="Description">просторная квартира</div>
    <table data-name="SummaryTable">
      <tr><th>Этаж</th><th>Площадь</th></tr>
      <tr><td>5</td><td>54 м²</td></tr>
    </table>
    </body></html>"#
    )
}

fn spider(server: &MockServer, sink: std::sync::Arc<MemorySink>) -> OffersSpider {
    OffersSpider::new(
        http_fetcher(),
        http_fetcher(),
        sink,
        api_settings(&server.uri()),
        None,
        4,
    )
}

#[tokio::test]
async fn test_chain_produces_enriched_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sale/flat/315467211/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("315467211")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/site-api/v1/breadcrumbs/"))
        .and(query_param("id", "315467211"))
        .and(query_param("appId", "X123"))
        .and(query_param("tid", "listing"))
        .and(query_param("siteType", "flat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data":{"list":[["Недвижимость"],["Купить квартиру"],["2-комнатная"]]}}"#,
        ))
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let stats = spider(&server, sink.clone())
        .run(vec![format!("{}/sale/flat/315467211/", server.uri())])
        .await;

    assert_eq!(stats.processed, 1);
    assert_eq!(stats.stored, 1);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.kind(), RecordKind::Offer);
    assert!(record.is_finalized());
    assert_eq!(record.get_text("title"), Some("2-комн. квартира, 54 м²"));
    assert_eq!(record.get_text("description"), Some("Просторная Квартира"));
    assert_eq!(record.get_text("offer_id"), Some("315467211"));
    assert_eq!(
        record.get("breadcrumbs"),
        Some(&FieldValue::List(vec![
            "Недвижимость".to_string(),
            "Купить квартиру".to_string(),
            "2-комнатная".to_string(),
        ]))
    );
    assert!(record.get_text("plain_html").unwrap().contains("<h1>"));
    assert_eq!(
        record.get("image_urls"),
        Some(&FieldValue::List(vec![
            "https://img.cian.ru/315467211-1.jpg".to_string(),
            "https://img.cian.ru/315467211-2.jpg".to_string(),
        ]))
    );
}

#[tokio::test]
async fn test_failed_enrichment_emits_no_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sale/flat/999/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("999")))
        .mount(&server)
        .await;
    // The breadcrumbs follow-up fails; the chain must not fall back
    // to storing the un-enriched record.
    Mock::given(method("GET"))
        .and(path("/site-api/v1/breadcrumbs/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let stats = spider(&server, sink.clone())
        .run(vec![format!("{}/sale/flat/999/", server.uri())])
        .await;

    assert_eq!(stats.processed, 1);
    assert_eq!(stats.stored, 0);
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn test_one_failing_chain_leaves_siblings_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sale/flat/111/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("111")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sale/flat/222/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/site-api/v1/breadcrumbs/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"data":{"list":[["Недвижимость"]]}}"#),
        )
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let stats = spider(&server, sink.clone())
        .run(vec![
            format!("{}/sale/flat/111/", server.uri()),
            format!("{}/sale/flat/222/", server.uri()),
        ])
        .await;

    assert_eq!(stats.processed, 2);
    assert_eq!(stats.stored, 1);
    assert_eq!(sink.records()[0].get_text("offer_id"), Some("111"));
}

#[tokio::test]
async fn test_page_without_identity_block_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sale/flat/333/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h1>Заголовок</h1></body></html>"),
        )
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let stats = spider(&server, sink.clone())
        .run(vec![format!("{}/sale/flat/333/", server.uri())])
        .await;

    assert_eq!(stats.stored, 0);
    assert!(sink.records().is_empty());
}
