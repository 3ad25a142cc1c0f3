// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::{api_settings, http_fetcher, MemorySink};
use cianrs::domain::record::RecordKind;
use cianrs::spiders::regions::RegionsSpider;
use std::collections::HashSet;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_region_api() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/regions/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"items":[
                {"id":1,"displayName":"Москва"},
                {"id":2,"displayName":"Санкт-Петербург"},
                {"id":3,"displayName":"Недоступный"}
            ]}"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/regions/detail"))
        .and(query_param("regionId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data":{"id":1,"displayName":"Москва","baseHost":"https://www.cian.ru","mainTownIds":["1"]}}"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/regions/detail"))
        .and(query_param("regionId", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data":{"id":2,"displayName":"Санкт-Петербург","baseHost":"https://spb.cian.ru"}}"#,
        ))
        .mount(&server)
        .await;

    // The third region's follow-up request fails
    Mock::given(method("GET"))
        .and(path("/regions/detail"))
        .and(query_param("regionId", "3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_failed_region_is_dropped_others_resolve() {
    let server = mock_region_api().await;
    let sink = MemorySink::new();
    let spider = RegionsSpider::new(http_fetcher(), sink.clone(), api_settings(&server.uri()));

    let catalog = spider.run().await.unwrap();

    assert_eq!(catalog.len(), 2);
    let hosts: HashSet<String> = catalog.base_hosts().into_iter().collect();
    assert_eq!(
        hosts,
        HashSet::from([
            "https://www.cian.ru".to_string(),
            "https://spb.cian.ru".to_string(),
        ])
    );

    let records = sink.records();
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.kind(), RecordKind::Region);
        assert!(record.get_text("baseHost").is_some());
    }
}

#[tokio::test]
async fn test_region_records_carry_detail_fields() {
    let server = mock_region_api().await;
    let sink = MemorySink::new();
    let spider = RegionsSpider::new(http_fetcher(), sink.clone(), api_settings(&server.uri()));

    spider.run().await.unwrap();

    let records = sink.records();
    let moscow = records
        .iter()
        .find(|r| r.get_text("id") == Some("1"))
        .expect("moscow record present");
    assert_eq!(moscow.get_text("displayName"), Some("Москва"));
    assert_eq!(moscow.get_text("baseHost"), Some("https://www.cian.ru"));
}

#[tokio::test]
async fn test_list_failure_aborts_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regions/list"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let spider = RegionsSpider::new(http_fetcher(), sink.clone(), api_settings(&server.uri()));

    assert!(spider.run().await.is_err());
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn test_detail_missing_base_host_drops_region() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regions/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"items":[{"id":7,"displayName":"Без хоста"}]}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/regions/detail"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"data":{"id":7,"displayName":"Без хоста"}}"#),
        )
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let spider = RegionsSpider::new(http_fetcher(), sink.clone(), api_settings(&server.uri()));

    let catalog = spider.run().await.unwrap();
    assert!(catalog.is_empty());
    assert!(sink.records().is_empty());
}
