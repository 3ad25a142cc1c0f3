// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::EngineError;
use std::error::Error as _;
use std::fmt;
use tracing::error;

/// 失败分类标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Dns,
    Timeout,
    HttpStatus,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            FailureKind::Dns => "dns",
            FailureKind::Timeout => "timeout",
            FailureKind::HttpStatus => "http_status",
            FailureKind::Other => "other",
        };
        f.write_str(tag)
    }
}

/// 失败报告
///
/// 对一次失败抓取的统一描述，仅用于日志，不作为领域数据存储
#[derive(Debug)]
pub struct FailureReport {
    pub kind: FailureKind,
    pub url: String,
    pub detail: String,
}

impl FailureReport {
    /// 以结构化日志输出报告
    ///
    /// 分类是纯观察性的：不触发重试或重新排队
    pub fn log(&self) {
        error!(kind = %self.kind, url = %self.url, detail = %self.detail, "fetch failed");
    }
}

/// 对失败的抓取进行分类
///
/// 优先级：存在HTTP响应按状态码归类；其次DNS解析失败；
/// 其次超时；其余归为other
///
/// # 参数
///
/// * `url` - 触发失败的URL
/// * `error` - 引擎返回的错误
///
/// # 返回值
///
/// 恰好一份失败报告
pub fn classify(url: &str, error: &EngineError) -> FailureReport {
    let (kind, detail) = match error {
        EngineError::HttpStatus { status, url } => (
            FailureKind::HttpStatus,
            format!("status code {} on {}", status, url),
        ),
        EngineError::RequestFailed(e) => {
            if let Some(status) = e.status() {
                (
                    FailureKind::HttpStatus,
                    format!("status code {}", status.as_u16()),
                )
            } else if is_dns_failure(e) {
                (FailureKind::Dns, e.to_string())
            } else if e.is_timeout() {
                (FailureKind::Timeout, e.to_string())
            } else {
                (FailureKind::Other, e.to_string())
            }
        }
        EngineError::Timeout => (FailureKind::Timeout, "request timed out".to_string()),
        EngineError::Browser(detail) => (FailureKind::Other, detail.clone()),
        EngineError::Other(detail) => (FailureKind::Other, detail.clone()),
    };

    FailureReport {
        kind,
        url: url.to_string(),
        detail,
    }
}

// reqwest does not expose DNS failures as a variant; walk the source
// chain and look for resolver wording from hickory/getaddrinfo.
fn is_dns_failure(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(inner) = source {
        let message = inner.to_string().to_lowercase();
        if message.contains("dns")
            || message.contains("failed to lookup address")
            || message.contains("name or service not known")
        {
            return true;
        }
        source = inner.source();
    }
    false
}
