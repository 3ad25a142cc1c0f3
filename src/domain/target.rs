// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 抓取目标
///
/// 一个待抓取的URL及其携带的上下文，创建后不可变，
/// 由调度它的阶段独占直至回调完成
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    /// 目标URL
    pub url: String,
    /// 携带的上下文
    pub context: TargetContext,
}

/// 抓取目标上下文
///
/// 已知的上下文变体，随请求链透传
#[derive(Debug, Clone)]
pub enum TargetContext {
    /// 报价详情页：来源报价标识
    Offer { offer_id: String },
    /// 区域详情：区域标识与展示名
    Region { id: i64, display_name: String },
}

impl CrawlTarget {
    pub fn new(url: impl Into<String>, context: TargetContext) -> Self {
        Self {
            url: url.into(),
            context,
        }
    }
}
