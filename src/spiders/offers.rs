// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ApiSettings;
use crate::crawler::fetcher::Fetcher;
use crate::domain::record::{Record, RecordKind};
use crate::domain::sink::RecordSink;
use crate::domain::target::{CrawlTarget, TargetContext};
use crate::engines::traits::{FetchRequest, FetchResponse};
use crate::extract::breadcrumbs::parse_breadcrumbs;
use crate::extract::detail::{extract_detail, PageIdentity};
use crate::utils::url_utils;
use futures::{stream, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

/// 详情链状态机
///
/// 每个条目一台有限状态机，每一步只在前一步的完成回调中
/// 推进，链内严格有序。记录在面包屑增强成功并通过终态
/// 校验之前不会产出
enum ChainState {
    Pending(CrawlTarget),
    Fetched {
        target: CrawlTarget,
        response: FetchResponse,
        screenshot: Option<PathBuf>,
    },
    Extracted {
        record: Record,
        identity: PageIdentity,
        url: String,
    },
    Enriching {
        record: Record,
        breadcrumbs: Vec<String>,
        url: String,
    },
    Finalized(Record),
    Failed,
}

/// 一次报价爬取的汇总统计
#[derive(Debug, Default, Clone, Copy)]
pub struct OffersStats {
    /// 消费的种子URL数
    pub processed: usize,
    /// 成功持久化的记录数
    pub stored: usize,
}

/// 报价详情爬虫
///
/// 消费种子URL，逐条驱动 抓取→提取→面包屑增强→终态→存储 的
/// 请求链。不同条目的链任意交错，单条链的失败不影响其他链
pub struct OffersSpider {
    /// 详情页抓取器（浏览器或HTTP引擎）
    page_fetcher: Arc<Fetcher>,
    /// 面包屑接口抓取器（始终走HTTP引擎）
    api_fetcher: Arc<Fetcher>,
    sink: Arc<dyn RecordSink>,
    api: ApiSettings,
    /// 整页截图输出目录；None表示不经浏览器渲染、不截图
    screenshot_dir: Option<PathBuf>,
    chain_concurrency: usize,
}

impl OffersSpider {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        page_fetcher: Arc<Fetcher>,
        api_fetcher: Arc<Fetcher>,
        sink: Arc<dyn RecordSink>,
        api: ApiSettings,
        screenshot_dir: Option<PathBuf>,
        chain_concurrency: usize,
    ) -> Self {
        Self {
            page_fetcher,
            api_fetcher,
            sink,
            api,
            screenshot_dir,
            chain_concurrency: chain_concurrency.max(1),
        }
    }

    /// 处理一批种子URL
    ///
    /// # 参数
    ///
    /// * `seed_urls` - 报价详情页URL列表
    ///
    /// # 返回值
    ///
    /// 汇总统计；失败只通过结构化日志行可见
    pub async fn run(&self, seed_urls: Vec<String>) -> OffersStats {
        let stored = stream::iter(seed_urls.iter())
            .map(|url| self.run_chain(url))
            .buffer_unordered(self.chain_concurrency)
            .filter(|stored| futures::future::ready(*stored))
            .count()
            .await;

        let stats = OffersStats {
            processed: seed_urls.len(),
            stored,
        };
        info!(processed = stats.processed, stored = stats.stored, "offers run finished");
        stats
    }

    /// 驱动一条详情链直至终止
    ///
    /// # 返回值
    ///
    /// 记录是否成功持久化
    pub async fn run_chain(&self, url: &str) -> bool {
        let Some(offer_id) = url_utils::offer_id_of(url) else {
            warn!(url = %url, "seed url has no offer id segment, skipped");
            return false;
        };

        let mut state = ChainState::Pending(CrawlTarget::new(
            url,
            TargetContext::Offer { offer_id },
        ));

        loop {
            state = match state {
                ChainState::Pending(target) => self.fetch_step(target).await,
                ChainState::Fetched {
                    target,
                    response,
                    screenshot,
                } => self.extract_step(target, response, screenshot),
                ChainState::Extracted {
                    record,
                    identity,
                    url,
                } => self.enrich_step(record, identity, url).await,
                ChainState::Enriching {
                    record,
                    breadcrumbs,
                    url,
                } => Self::finalize_step(record, breadcrumbs, &url),
                ChainState::Finalized(record) => return self.store_step(record).await,
                ChainState::Failed => return false,
            };
        }
    }

    async fn fetch_step(&self, target: CrawlTarget) -> ChainState {
        let screenshot = match (&self.screenshot_dir, &target.context) {
            (Some(dir), TargetContext::Offer { offer_id }) => {
                Some(dir.join(format!("{}.png", offer_id)))
            }
            _ => None,
        };

        let mut request = FetchRequest::new(&target.url, self.page_fetcher.timeout());
        if let Some(path) = &screenshot {
            request = request.with_screenshot(path.clone());
        }

        match self.page_fetcher.try_fetch(&request).await {
            Some(response) => ChainState::Fetched {
                target,
                response,
                screenshot,
            },
            None => ChainState::Failed,
        }
    }

    fn extract_step(
        &self,
        target: CrawlTarget,
        response: FetchResponse,
        screenshot: Option<PathBuf>,
    ) -> ChainState {
        let html = response.text();
        info!(url = %response.final_url, "parsing offer");

        let page = match extract_detail(&html) {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %target.url, error = %e, "extraction failed, offer dropped");
                return ChainState::Failed;
            }
        };

        let mut record = Record::new(RecordKind::Offer);
        record.set_text("url", &response.final_url);
        record.set_text("title", &page.title);
        record.set_text("description", &page.description);
        record.set_list("image_urls", page.media_urls.clone());
        record.set_table("specification", page.specification.clone());
        record.set_text("app_id", &page.identity.app_id);
        record.set_text("offer_id", &page.identity.offer_id);
        record.set_text("instance", &page.identity.instance);
        record.set_text("page_type", &page.identity.page_type);
        record.set_text("page_name", &page.identity.page_name);
        record.set_text("plain_html", &html);
        if let Some(path) = screenshot {
            record.set_text("screenshot_path", path.to_string_lossy());
        }

        ChainState::Extracted {
            record,
            identity: page.identity,
            url: target.url,
        }
    }

    async fn enrich_step(
        &self,
        record: Record,
        identity: PageIdentity,
        url: String,
    ) -> ChainState {
        let breadcrumbs_url = match self.breadcrumbs_url(&identity) {
            Ok(u) => u,
            Err(e) => {
                warn!(url = %url, error = %e, "breadcrumbs url could not be built");
                return ChainState::Failed;
            }
        };

        let request = FetchRequest::new(breadcrumbs_url, self.api_fetcher.timeout());
        let Some(response) = self.api_fetcher.try_fetch(&request).await else {
            return ChainState::Failed;
        };

        match parse_breadcrumbs(&response.text()) {
            Ok(breadcrumbs) => ChainState::Enriching {
                record,
                breadcrumbs,
                url,
            },
            Err(e) => {
                warn!(url = %url, error = %e, "breadcrumbs response rejected, offer dropped");
                ChainState::Failed
            }
        }
    }

    fn finalize_step(mut record: Record, breadcrumbs: Vec<String>, url: &str) -> ChainState {
        record.set_list("breadcrumbs", breadcrumbs);
        match record.finalize() {
            Ok(()) => ChainState::Finalized(record),
            Err(e) => {
                warn!(url = %url, error = %e, "record failed final validation");
                ChainState::Failed
            }
        }
    }

    async fn store_step(&self, record: Record) -> bool {
        match self.sink.store(record).await {
            Ok(()) => true,
            Err(e) => {
                // Fatal to the item, not to the run
                error!(error = %e, "failed to persist offer record");
                false
            }
        }
    }

    fn breadcrumbs_url(&self, identity: &PageIdentity) -> Result<String, url::ParseError> {
        let mut endpoint = Url::parse(&self.api.breadcrumbs)?;
        endpoint
            .query_pairs_mut()
            .append_pair("tid", &self.api.tid)
            .append_pair("siteType", &self.api.site_type)
            .append_pair("appId", &identity.app_id)
            .append_pair("id", &identity.offer_id)
            .append_pair("instance", &identity.instance)
            .append_pair("pageType", &identity.page_type)
            .append_pair("pageName", &identity.page_name);
        Ok(endpoint.to_string())
    }
}
