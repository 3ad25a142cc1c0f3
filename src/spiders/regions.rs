// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ApiSettings;
use crate::crawler::fetcher::Fetcher;
use crate::domain::record::{Record, RecordKind};
use crate::domain::region::{RegionCatalog, RegionEntry};
use crate::domain::sink::RecordSink;
use crate::domain::target::{CrawlTarget, TargetContext};
use crate::engines::traits::{EngineError, FetchRequest};
use futures::{stream, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

// Fan-out width for per-region detail requests; the fetcher still
// enforces the per-domain limits underneath.
const RESOLVE_CONCURRENCY: usize = 16;

#[derive(Debug, Deserialize)]
struct RegionListResponse {
    items: Vec<RegionListItem>,
}

#[derive(Debug, Deserialize)]
struct RegionListItem {
    id: i64,
    #[serde(rename = "displayName")]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct RegionDetailResponse {
    data: serde_json::Value,
}

/// 区域解析爬虫
///
/// 拉取联邦主体列表，对每个条目发起后续详情请求，
/// 产出一条Region记录与一个区域目录条目。
/// 单个区域的失败只丢弃该区域，不中止其余区域的解析
pub struct RegionsSpider {
    fetcher: Arc<Fetcher>,
    sink: Arc<dyn RecordSink>,
    api: ApiSettings,
}

impl RegionsSpider {
    pub fn new(fetcher: Arc<Fetcher>, sink: Arc<dyn RecordSink>, api: ApiSettings) -> Self {
        Self { fetcher, sink, api }
    }

    /// 执行区域解析
    ///
    /// # 返回值
    ///
    /// * `Ok(RegionCatalog)` - 成功解析区域的只读目录
    /// * `Err(EngineError)` - 区域列表请求本身失败
    pub async fn run(&self) -> Result<RegionCatalog, EngineError> {
        let request = FetchRequest::new(&self.api.region_list, self.fetcher.timeout());
        let response = self.fetcher.fetch(&request).await?;
        info!(url = %self.api.region_list, "received region list");

        let list: RegionListResponse = serde_json::from_slice(&response.body)
            .map_err(|e| EngineError::Other(format!("region list response: {}", e)))?;

        let entries: Vec<RegionEntry> = stream::iter(list.items)
            .map(|item| {
                // The follow-up request carries its region through the chain
                self.resolve_region(CrawlTarget::new(
                    format!("{}?regionId={}", self.api.region_detail, item.id),
                    TargetContext::Region {
                        id: item.id,
                        display_name: item.display_name,
                    },
                ))
            })
            .buffer_unordered(RESOLVE_CONCURRENCY)
            .filter_map(|entry| async move { entry })
            .collect()
            .await;

        info!(regions = entries.len(), "region catalog built");
        Ok(RegionCatalog::new(entries))
    }

    // One region's chain: detail fetch, record build, persist. Any
    // failure drops this region only.
    async fn resolve_region(&self, target: CrawlTarget) -> Option<RegionEntry> {
        let TargetContext::Region { id, display_name } = target.context else {
            return None;
        };

        let request = FetchRequest::new(&target.url, self.fetcher.timeout());
        let response = self.fetcher.try_fetch(&request).await?;

        let detail: RegionDetailResponse = match serde_json::from_slice(&response.body) {
            Ok(detail) => detail,
            Err(e) => {
                warn!(region = %display_name, error = %e, "malformed region detail, dropped");
                return None;
            }
        };
        let Some(data) = detail.data.as_object() else {
            warn!(region = %display_name, "region detail `data` is not an object, dropped");
            return None;
        };

        info!(region = %display_name, "parsed region");

        let mut record = Record::new(RecordKind::Region);
        record.absorb_json(data);
        if let Err(e) = record.finalize() {
            warn!(region = %display_name, error = %e, "incomplete region detail, dropped");
            return None;
        }

        let base_host = record.get_text("baseHost")?.to_string();

        if let Err(e) = self.sink.store(record).await {
            error!(region = %display_name, error = %e, "failed to persist region");
            return None;
        }

        Some(RegionEntry {
            id,
            display_name,
            base_host,
        })
    }
}
