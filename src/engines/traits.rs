// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 响应状态码非2xx
    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 浏览器引擎错误
    #[error("Browser error: {0}")]
    Browser(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// 抓取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 超时时间
    pub timeout: Duration,
    /// 整页截图输出路径，仅浏览器引擎支持
    pub screenshot_path: Option<PathBuf>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            screenshot_path: None,
        }
    }

    pub fn with_screenshot(mut self, path: PathBuf) -> Self {
        self.screenshot_path = Some(path);
        self
    }
}

/// 抓取响应
///
/// 响应体保留原始字节，站点地图叶子可能是gzip负载
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status: u16,
    /// 重定向后的最终URL
    pub final_url: String,
    /// 响应体字节
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// 响应体的文本视图
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// 抓取引擎特质
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// 执行抓取
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
