// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

/// 归一化URL用于访问集合去重
///
/// 去除fragment与末尾斜杠，使等价URL在访问集合中视为同一项
///
/// # 参数
///
/// * `raw` - 原始URL字符串
///
/// # 返回值
///
/// 归一化后的URL字符串；无法解析的输入原样返回
pub fn normalize(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            let mut s = url.to_string();
            if s.ends_with('/') && url.path() != "/" {
                s.pop();
            }
            s
        }
        Err(_) => raw.trim_end_matches('/').to_string(),
    }
}

/// 提取URL所属域名，用于按域名限速
pub fn domain_of(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| raw.to_string())
}

/// 从详情页URL提取报价标识
///
/// 报价URL以 `/{offer_id}/` 结尾，取最后一个非空路径段
pub fn offer_id_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(|s| s.to_string())
}

/// 将相对href解析为绝对URL
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}
