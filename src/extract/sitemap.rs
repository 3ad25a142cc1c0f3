// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use flate2::read::GzDecoder;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::io::Read;

static LOC_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("loc").unwrap());

/// 提取站点地图文档中的全部 `<loc>` 条目
///
/// 同时适用于sitemap-index（条目指向下级站点地图）
/// 与叶子站点地图（条目指向最终页面）。空文档产出空列表
pub fn extract_locs(xml: &str) -> Vec<String> {
    let document = Html::parse_document(xml);
    document
        .select(&LOC_SELECTOR)
        .map(|loc| loc.text().collect::<String>().trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect()
}

/// 需要时在内存中解压gzip负载
///
/// 按gzip魔数判断：压缩负载完整解压，普通XML原样返回。
/// 截断或损坏的压缩流返回IO错误，由调用方按抓取失败处理
///
/// # 参数
///
/// * `body` - 响应体字节
pub fn gunzip_if_needed(body: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    if body.len() >= 2 && body[0] == 0x1f && body[1] == 0x8b {
        let mut decoder = GzDecoder::new(body);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    } else {
        Ok(body.to_vec())
    }
}

/// 按允许的路径子串过滤挂牌URL
pub fn filter_listing_urls(urls: Vec<String>, allow_patterns: &[String]) -> Vec<String> {
    urls.into_iter()
        .filter(|url| allow_patterns.iter().any(|pattern| url.contains(pattern)))
        .collect()
}
