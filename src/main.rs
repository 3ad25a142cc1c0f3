// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use cianrs::config::settings::Settings;
use cianrs::crawler::fetcher::Fetcher;
use cianrs::engines::browser_engine::BrowserEngine;
use cianrs::engines::http_engine::HttpEngine;
use cianrs::engines::traits::FetchEngine;
use cianrs::spiders::category::CategoryWalker;
use cianrs::spiders::offers::OffersSpider;
use cianrs::spiders::regions::RegionsSpider;
use cianrs::spiders::urls::UrlsSpider;
use cianrs::storage::pipeline::MongoPipeline;
use cianrs::utils::{seeds, telemetry};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// cian.ru 挂牌数据爬取流水线
#[derive(Parser)]
#[command(name = "cianrs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 解析区域目录并写入 `regions` 集合
    Regions,
    /// 按区域主机遍历站点地图，发现挂牌URL并写入 `urls` 集合
    Urls,
    /// 消费 urls.json 种子，爬取报价详情并写入 `offers` 集合
    Offers,
    /// 从分类落地页遍历分类树，再对发现的详情页走报价链
    Category {
        /// 分类落地页URL
        #[arg(long)]
        url: String,
    },
}

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并分发爬取阶段
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting cianrs...");

    let cli = Cli::parse();

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Connect to the document store
    let pipeline = Arc::new(MongoPipeline::connect(&settings.mongodb).await?);

    // 4. Initialize engines and the rate-limited fetcher
    let timeout = Duration::from_secs(settings.crawl.request_timeout_secs);
    let http_engine: Arc<dyn FetchEngine> =
        Arc::new(HttpEngine::new(&settings.crawl.user_agent, timeout)?);
    let http_fetcher = Arc::new(Fetcher::new(http_engine.clone(), &settings.crawl));

    match cli.command {
        Command::Regions => {
            let spider = RegionsSpider::new(http_fetcher, pipeline, settings.api.clone());
            let catalog = spider.run().await?;
            info!(regions = catalog.len(), "regions run finished");
        }
        Command::Urls => {
            let hosts = seeds::load_seed_hosts(&settings.crawl.regions_seed)?;
            info!(hosts = hosts.len(), "seeded sitemap hosts");

            let spider = UrlsSpider::new(
                http_fetcher,
                pipeline,
                settings.crawl.allow_patterns.clone(),
            );
            let stored = spider.run(&hosts).await;
            info!(stored, "urls run finished");
        }
        Command::Offers => {
            let mut seed_urls = seeds::load_seed_urls(&settings.crawl.urls_seed)?;
            seed_urls.truncate(settings.crawl.max_seed_urls);
            info!(seeds = seed_urls.len(), "seeded offer urls");

            let spider = offers_spider(&settings, http_fetcher, pipeline)?;
            spider.run(seed_urls).await;
        }
        Command::Category { url } => {
            let walker = CategoryWalker::new(
                http_fetcher.clone(),
                settings.crawl.detail_marker.clone(),
                settings.crawl.pagination_marker.clone(),
            );
            let detail_urls = walker.walk(&url).await;

            let spider = offers_spider(&settings, http_fetcher, pipeline)?;
            spider.run(detail_urls).await;
        }
    }

    Ok(())
}

// Detail pages go through the browser engine (with screenshot capture)
// when rendering is enabled; the breadcrumbs API always stays on HTTP.
fn offers_spider(
    settings: &Settings,
    http_fetcher: Arc<Fetcher>,
    pipeline: Arc<MongoPipeline>,
) -> anyhow::Result<OffersSpider> {
    let (page_fetcher, screenshot_dir) = if settings.browser.enabled {
        let engine: Arc<dyn FetchEngine> = Arc::new(BrowserEngine);
        (
            Arc::new(Fetcher::new(engine, &settings.crawl)),
            Some(PathBuf::from(&settings.crawl.screenshot_dir)),
        )
    } else {
        (http_fetcher.clone(), None)
    };

    Ok(OffersSpider::new(
        page_fetcher,
        http_fetcher,
        pipeline,
        settings.api.clone(),
        screenshot_dir,
        settings.crawl.concurrent_per_domain,
    ))
}
