// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::{http_fetcher, MemorySink};
use cianrs::domain::record::RecordKind;
use cianrs::spiders::urls::UrlsSpider;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashSet;
use std::io::Write;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn allow_patterns() -> Vec<String> {
    vec!["/sale/flat/".to_string(), "/rent/flat/".to_string()]
}

async fn mock_sitemap_host() -> MockServer {
    let server = MockServer::start().await;
    let base = server.uri();

    let index = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex>
  <sitemap><loc>{base}/sitemap-1.xml.gz</loc></sitemap>
  <sitemap><loc>{base}/sitemap-2.xml.gz</loc></sitemap>
  <sitemap><loc>{base}/sitemap-3.xml</loc></sitemap>
</sitemapindex>"#
    );

    let leaf_one = r#"<urlset>
  <url><loc>https://www.cian.ru/sale/flat/1/</loc></url>
  <url><loc>https://www.cian.ru/rent/flat/2/</loc></url>
  <url><loc>https://www.cian.ru/novostroyki/3/</loc></url>
</urlset>"#;

    let leaf_three = r#"<urlset>
  <url><loc>https://www.cian.ru/sale/flat/1/</loc></url>
  <url><loc>https://www.cian.ru/sale/flat/4/</loc></url>
</urlset>"#;

    // Leaf two is a corrupt compressed payload
    let mut corrupt = gzip(leaf_one.as_bytes());
    corrupt.truncate(corrupt.len() / 2);

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap-1.xml.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(leaf_one.as_bytes())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap-2.xml.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(corrupt))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap-3.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(leaf_three))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_discovery_filters_dedupes_and_survives_corrupt_leaf() {
    let server = mock_sitemap_host().await;
    let sink = MemorySink::new();
    let spider = UrlsSpider::new(http_fetcher(), sink, allow_patterns());

    let discovered = spider.discover(&[server.uri()]).await;

    // The corrupt leaf is skipped; its siblings still contribute.
    // Filtering drops the novostroyki entry, deduplication keeps
    // one copy of the listing present in both surviving leaves.
    let unique: HashSet<&str> = discovered.iter().map(String::as_str).collect();
    assert_eq!(discovered.len(), unique.len(), "no duplicates in output");
    assert_eq!(
        unique,
        HashSet::from([
            "https://www.cian.ru/sale/flat/1/",
            "https://www.cian.ru/rent/flat/2/",
            "https://www.cian.ru/sale/flat/4/",
        ])
    );
}

#[tokio::test]
async fn test_run_persists_one_record_per_discovered_url() {
    let server = mock_sitemap_host().await;
    let sink = MemorySink::new();
    let spider = UrlsSpider::new(http_fetcher(), sink.clone(), allow_patterns());

    let stored = spider.run(&[server.uri()]).await;

    assert_eq!(stored, 3);
    let records = sink.records();
    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record.kind(), RecordKind::Url);
        assert!(record.get_text("url").is_some());
        assert!(record.get_text("crawled_at").is_some());
    }
}

#[tokio::test]
async fn test_unreachable_host_yields_empty_discovery() {
    let sink = MemorySink::new();
    let spider = UrlsSpider::new(http_fetcher(), sink.clone(), allow_patterns());

    // Nothing listens on this port; the root fetch fails and is logged.
    let discovered = spider.discover(&["http://127.0.0.1:9".to_string()]).await;

    assert!(discovered.is_empty());
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn test_empty_sitemap_yields_zero_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<sitemapindex></sitemapindex>"))
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let spider = UrlsSpider::new(http_fetcher(), sink, allow_patterns());

    assert!(spider.discover(&[server.uri()]).await.is_empty());
}
