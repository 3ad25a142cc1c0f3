// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, FetchEngine, FetchRequest, FetchResponse};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::OnceCell;

// Global browser instance to avoid re-launching Chrome on every request.
static BROWSER_INSTANCE: OnceCell<Browser> = OnceCell::const_new();

// Asynchronously gets or initializes the shared browser instance.
// This function ensures that the browser is launched only once.
async fn get_browser() -> Result<&'static Browser, EngineError> {
    BROWSER_INSTANCE
        .get_or_try_init(|| async {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(Duration::from_secs(30));

            builder = builder
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .arg("--blink-settings=imagesEnabled=false");

            let (browser, mut handler) = Browser::launch(
                builder.build().map_err(|e| EngineError::Browser(e.to_string()))?,
            )
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

            // Spawn a handler to process browser events
            tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(browser)
        })
        .await
}

/// 浏览器抓取引擎
///
/// 基于chromiumoxide的渲染引擎，详情页经浏览器加载，
/// 并按请求把整页截图写入本地侧文件
pub struct BrowserEngine;

#[async_trait]
impl FetchEngine for BrowserEngine {
    /// 执行浏览器渲染抓取
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求，`screenshot_path` 存在时捕获整页截图
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 渲染后的页面内容
    /// * `Err(EngineError)` - 渲染或截图过程中出现的错误
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        let browser = get_browser().await?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        let result = tokio::time::timeout(request.timeout, render(&page, request))
            .await
            .unwrap_or(Err(EngineError::Timeout));

        // Dropping the handle does not close the CDP target; close it
        // explicitly so long runs never accumulate one live tab per page,
        // on the failure and timeout paths included.
        let _ = page.close().await;

        result
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}

async fn render(page: &Page, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
    // goto waits for the load event by default
    page.goto(&request.url)
        .await
        .map_err(|e| EngineError::Browser(e.to_string()))?;

    let content = page
        .content()
        .await
        .map_err(|e| EngineError::Browser(e.to_string()))?;

    if let Some(path) = &request.screenshot_path {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?;
        }

        let params = chromiumoxide::page::ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        page.save_screenshot(params, path)
            .await
            .map_err(|e| EngineError::Browser(format!("Page screenshot failed: {}", e)))?;
    }

    // chromiumoxide goto returns Page, not a Response; assume success once loaded
    Ok(FetchResponse {
        status: 200,
        final_url: request.url.clone(),
        body: content.into_bytes(),
    })
}
