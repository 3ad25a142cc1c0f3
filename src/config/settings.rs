// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含爬取、外部API、浏览器与MongoDB等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 爬取配置
    pub crawl: CrawlSettings,
    /// 外部API配置
    pub api: ApiSettings,
    /// 浏览器渲染配置
    pub browser: BrowserSettings,
    /// MongoDB配置
    pub mongodb: MongoSettings,
}

/// 爬取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// 每个域名的最大并发请求数
    pub concurrent_per_domain: usize,
    /// 同一域名两次请求之间的最小间隔（毫秒），0表示不限速
    pub download_delay_ms: u64,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// User-Agent请求头
    pub user_agent: String,
    /// 站点地图URL过滤子串，命中任一即保留
    pub allow_patterns: Vec<String>,
    /// 详情页链接标记，href包含该子串时视为终端页
    pub detail_marker: String,
    /// 分页链接标记
    pub pagination_marker: String,
    /// 报价URL种子文件
    pub urls_seed: String,
    /// 区域种子文件
    pub regions_seed: String,
    /// 本次运行处理的种子URL上限
    pub max_seed_urls: usize,
    /// 截图输出目录
    pub screenshot_dir: String,
}

/// 外部API配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// 区域列表接口
    pub region_list: String,
    /// 区域详情接口（追加 regionId 查询参数）
    pub region_detail: String,
    /// 面包屑解析接口
    pub breadcrumbs: String,
    /// 面包屑接口 tid 参数
    pub tid: String,
    /// 面包屑接口 siteType 参数
    pub site_type: String,
}

/// 浏览器渲染配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 详情页是否经浏览器渲染并截图
    pub enabled: bool,
}

/// MongoDB配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MongoSettings {
    /// 连接URI
    pub uri: String,
    /// 目标数据库名
    pub database: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、配置文件与环境变量加载配置
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Crawl defaults mirror the production run profile
            .set_default("crawl.concurrent_per_domain", 16)?
            .set_default("crawl.download_delay_ms", 16)?
            .set_default("crawl.request_timeout_secs", 30)?
            .set_default(
                "crawl.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 YaBrowser/24.4.0.0 Safari/537.36",
            )?
            .set_default(
                "crawl.allow_patterns",
                vec!["/sale/flat/".to_string(), "/rent/flat/".to_string()],
            )?
            .set_default("crawl.detail_marker", "/flat/")?
            .set_default("crawl.pagination_marker", "p=")?
            .set_default("crawl.urls_seed", "urls.json")?
            .set_default("crawl.regions_seed", "regions.json")?
            .set_default("crawl.max_seed_urls", 1_000_000)?
            .set_default("crawl.screenshot_dir", "images")?
            // API defaults
            .set_default(
                "api.region_list",
                "https://api.cian.ru/geo-temp-layer/v1/get-federal-subjects-of-russia/",
            )?
            .set_default(
                "api.region_detail",
                "https://spb.cian.ru/cian-api/site/v1/get-region/",
            )?
            .set_default(
                "api.breadcrumbs",
                "https://www.cian.ru/site-api/v1/breadcrumbs/",
            )?
            .set_default("api.tid", "listing")?
            .set_default("api.site_type", "flat")?
            // Browser defaults
            .set_default("browser.enabled", true)?
            // MongoDB defaults
            .set_default("mongodb.uri", "mongodb://localhost:27017")?
            .set_default("mongodb.database", "offers")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CIANRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
