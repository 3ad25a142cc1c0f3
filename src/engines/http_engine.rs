// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, FetchEngine, FetchRequest, FetchResponse};
use async_trait::async_trait;
use std::time::Duration;

/// HTTP抓取引擎
///
/// 基于reqwest实现，启用cookie存储以维持站点会话
pub struct HttpEngine {
    client: reqwest::Client,
}

impl HttpEngine {
    /// 创建新的HTTP引擎实例
    ///
    /// # 参数
    ///
    /// * `user_agent` - User-Agent请求头
    /// * `timeout` - 默认请求超时
    ///
    /// # 返回值
    ///
    /// * `Ok(HttpEngine)` - 引擎实例
    /// * `Err(EngineError)` - 客户端构建失败
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FetchEngine for HttpEngine {
    /// 执行HTTP抓取
    ///
    /// 非2xx状态码作为 [`EngineError::HttpStatus`] 返回，
    /// 交由失败分类器按状态码归类
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        let response = self
            .client
            .get(&request.url)
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(EngineError::HttpStatus {
                status: status.as_u16(),
                url: final_url,
            });
        }

        let body = response.bytes().await?.to_vec();

        Ok(FetchResponse {
            status: status.as_u16(),
            final_url,
            body,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
