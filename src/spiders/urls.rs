// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::crawler::fetcher::Fetcher;
use crate::domain::record::{Record, RecordKind};
use crate::domain::sink::RecordSink;
use crate::engines::failure::{FailureKind, FailureReport};
use crate::engines::traits::FetchRequest;
use crate::extract::sitemap;
use futures::{stream, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

const LEAF_CONCURRENCY: usize = 16;

/// URL发现爬虫
///
/// 遍历每个区域主机的站点地图层级：根文档为sitemap-index，
/// 下钻一层到叶子站点地图（可能为gzip压缩），抽取 `<loc>` 条目，
/// 按路径子串过滤挂牌URL并在本次运行内精确去重
pub struct UrlsSpider {
    fetcher: Arc<Fetcher>,
    sink: Arc<dyn RecordSink>,
    allow_patterns: Vec<String>,
}

impl UrlsSpider {
    pub fn new(
        fetcher: Arc<Fetcher>,
        sink: Arc<dyn RecordSink>,
        allow_patterns: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            sink,
            allow_patterns,
        }
    }

    /// 发现候选挂牌URL
    ///
    /// 叶子级失败（抓取失败或压缩负载损坏）跳过该叶子并继续
    /// 处理兄弟节点，部分发现是可接受结果而非致命错误。
    /// 空站点地图产出零个URL
    ///
    /// # 参数
    ///
    /// * `hosts` - 区域基础主机列表，如 `https://spb.cian.ru`
    ///
    /// # 返回值
    ///
    /// 去重后的挂牌URL列表，保持发现顺序
    pub async fn discover(&self, hosts: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut discovered = Vec::new();

        for host in hosts {
            let root_url = format!("{}/sitemap.xml", host.trim_end_matches('/'));
            let request = FetchRequest::new(&root_url, self.fetcher.timeout());
            let Some(response) = self.fetcher.try_fetch(&request).await else {
                continue;
            };
            info!(url = %root_url, "received sitemap index");

            let leaf_urls = sitemap::extract_locs(&response.text());

            let mut leaves = stream::iter(leaf_urls)
                .map(|leaf_url| self.fetch_leaf(leaf_url))
                .buffer_unordered(LEAF_CONCURRENCY);

            while let Some(urls) = leaves.next().await {
                for url in urls {
                    if seen.insert(url.clone()) {
                        discovered.push(url);
                    }
                }
            }
        }

        info!(urls = discovered.len(), "url discovery finished");
        discovered
    }

    /// 发现并持久化：每个URL一条 `urls` 记录
    ///
    /// # 返回值
    ///
    /// 成功写入的记录数
    pub async fn run(&self, hosts: &[String]) -> usize {
        let mut stored = 0;
        for url in self.discover(hosts).await {
            let mut record = Record::new(RecordKind::Url);
            record.set_text("url", &url);
            let Ok(()) = record.finalize() else {
                continue;
            };

            match self.sink.store(record).await {
                Ok(()) => stored += 1,
                Err(e) => error!(url = %url, error = %e, "failed to persist url record"),
            }
        }
        stored
    }

    // One leaf sitemap: fetch, gunzip in memory, extract and filter.
    // Failures surface as an empty contribution.
    async fn fetch_leaf(&self, leaf_url: String) -> Vec<String> {
        let request = FetchRequest::new(&leaf_url, self.fetcher.timeout());
        let Some(response) = self.fetcher.try_fetch(&request).await else {
            return Vec::new();
        };

        let payload = match sitemap::gunzip_if_needed(&response.body) {
            Ok(payload) => payload,
            Err(e) => {
                FailureReport {
                    kind: FailureKind::Other,
                    url: leaf_url,
                    detail: format!("malformed compressed sitemap: {}", e),
                }
                .log();
                return Vec::new();
            }
        };

        let locs = sitemap::extract_locs(&String::from_utf8_lossy(&payload));
        sitemap::filter_listing_urls(locs, &self.allow_patterns)
    }
}
