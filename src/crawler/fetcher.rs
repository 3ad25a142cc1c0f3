// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::CrawlSettings;
use crate::engines::failure::classify;
use crate::engines::traits::{EngineError, FetchEngine, FetchRequest, FetchResponse};
use crate::utils::url_utils;
use dashmap::DashMap;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

/// 受限抓取器
///
/// 包装底层引擎并施加两层按域名的资源约束：
/// 最大并发请求数（信号量）与最小请求间隔（限速器）。
/// 挂起只发生在网络抓取边界，解析回调不在此层执行
pub struct Fetcher {
    engine: Arc<dyn FetchEngine>,
    limiter: Option<DefaultKeyedRateLimiter<String>>,
    slots: DashMap<String, Arc<Semaphore>>,
    concurrent_per_domain: usize,
    timeout: Duration,
}

impl Fetcher {
    /// 按爬取配置创建抓取器
    pub fn new(engine: Arc<dyn FetchEngine>, settings: &CrawlSettings) -> Self {
        Self::with_limits(
            engine,
            settings.concurrent_per_domain,
            Duration::from_millis(settings.download_delay_ms),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// 以显式参数创建抓取器
    ///
    /// # 参数
    ///
    /// * `engine` - 底层抓取引擎
    /// * `concurrent_per_domain` - 每域名最大并发请求数
    /// * `delay` - 每域名最小请求间隔，零表示不限速
    /// * `timeout` - 默认请求超时
    pub fn with_limits(
        engine: Arc<dyn FetchEngine>,
        concurrent_per_domain: usize,
        delay: Duration,
        timeout: Duration,
    ) -> Self {
        let limiter = Quota::with_period(delay).map(RateLimiter::keyed);
        Self {
            engine,
            limiter,
            slots: DashMap::new(),
            concurrent_per_domain: concurrent_per_domain.max(1),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 抓取一个URL
    ///
    /// 先占用域名并发槽位，再等待限速窗口，最后交给引擎。
    /// 同一链内的后继请求只会在前一步完成回调中调度，
    /// 跨链之间无任何顺序保证
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        let domain = url_utils::domain_of(&request.url);

        let slot = self
            .slots
            .entry(domain.clone())
            .or_insert_with(|| Arc::new(Semaphore::new(self.concurrent_per_domain)))
            .value()
            .clone();
        let _permit = slot
            .acquire_owned()
            .await
            .map_err(|e| EngineError::Other(e.to_string()))?;

        if let Some(limiter) = &self.limiter {
            limiter.until_key_ready(&domain).await;
        }

        debug!(url = %request.url, engine = self.engine.name(), "fetching");
        self.engine.fetch(request).await
    }

    /// 抓取一个URL，失败时分类记录并返回None
    ///
    /// 失败仅限于该条目，不影响其他条目的抓取，也不重试
    pub async fn try_fetch(&self, request: &FetchRequest) -> Option<FetchResponse> {
        match self.fetch(request).await {
            Ok(response) => Some(response),
            Err(error) => {
                classify(&request.url, &error).log();
                None
            }
        }
    }
}
