// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::crawler::fetcher::Fetcher;
use crate::engines::traits::FetchRequest;
use crate::utils::url_utils;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// 分类树遍历器
///
/// 从分类落地页出发，递归展开两类链接：分页链接总是回到
/// 分类展开；挂牌链接按是否带详情页标记分流到详情抽取或
/// 继续分类展开。脚本伪链接等非导航href被跳过。
/// 每次运行持有按归一化URL键控的访问集合，即使站点的
/// 分页链接成环也保证终止
pub struct CategoryWalker {
    fetcher: Arc<Fetcher>,
    detail_marker: String,
    pagination_marker: String,
}

impl CategoryWalker {
    pub fn new(fetcher: Arc<Fetcher>, detail_marker: String, pagination_marker: String) -> Self {
        Self {
            fetcher,
            detail_marker,
            pagination_marker,
        }
    }

    /// 从落地页展开整棵分类树
    ///
    /// # 参数
    ///
    /// * `start_url` - 分类落地页URL
    ///
    /// # 返回值
    ///
    /// 去重后的详情页URL列表，供详情抽取阶段消费
    pub async fn walk(&self, start_url: &str) -> Vec<String> {
        let start_host = url_utils::domain_of(start_url);

        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut detail_seen: HashSet<String> = HashSet::new();
        let mut detail_urls: Vec<String> = Vec::new();

        visited.insert(url_utils::normalize(start_url));
        queue.push_back(start_url.to_string());

        while let Some(page_url) = queue.pop_front() {
            let request = FetchRequest::new(&page_url, self.fetcher.timeout());
            let Some(response) = self.fetcher.try_fetch(&request).await else {
                continue;
            };
            debug!(url = %page_url, queued = queue.len(), "expanding category page");

            for href in extract_hrefs(&response.text()) {
                let Some(absolute) = url_utils::absolutize(&response.final_url, &href) else {
                    continue;
                };
                // Stay within the originating host, mirroring the
                // allowed-domains restriction of the crawl
                if url_utils::domain_of(&absolute) != start_host {
                    continue;
                }

                let normalized = url_utils::normalize(&absolute);

                if href.contains(&self.pagination_marker)
                    || absolute.contains(&self.pagination_marker)
                {
                    // Pagination always re-enters category expansion
                    if visited.insert(normalized) {
                        queue.push_back(absolute);
                    }
                } else if absolute.contains(&self.detail_marker) {
                    // Terminal page marker routes to detail extraction
                    if detail_seen.insert(normalized) {
                        detail_urls.push(absolute);
                    }
                } else if visited.insert(normalized) {
                    queue.push_back(absolute);
                }
            }
        }

        info!(
            pages = visited.len(),
            details = detail_urls.len(),
            "category walk finished"
        );
        detail_urls
    }
}

// Collects navigational hrefs only; script-triggered pseudo-links,
// fragments and mail links are not crawlable.
fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| {
            !href.is_empty()
                && !href.starts_with('#')
                && !href.starts_with("javascript:")
                && !href.starts_with("mailto:")
        })
        .map(|href| href.to_string())
        .collect()
}
