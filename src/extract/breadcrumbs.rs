// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::ExtractError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BreadcrumbsResponse {
    data: BreadcrumbsData,
}

#[derive(Debug, Deserialize)]
struct BreadcrumbsData {
    list: Vec<Vec<serde_json::Value>>,
}

/// 解析面包屑接口响应
///
/// 响应形如 `{"data": {"list": [[label, ...], ...]}}`；
/// 每个内层列表只保留第一个元素作为面包屑标签，
/// 空的内层列表跳过
///
/// # 参数
///
/// * `body` - 接口响应体
///
/// # 返回值
///
/// * `Ok(Vec<String>)` - 面包屑标签列表
/// * `Err(ExtractError)` - 响应结构不符合预期
pub fn parse_breadcrumbs(body: &str) -> Result<Vec<String>, ExtractError> {
    let response: BreadcrumbsResponse =
        serde_json::from_str(body).map_err(|e| ExtractError::ApiShape(e.to_string()))?;

    Ok(response
        .data
        .list
        .into_iter()
        .filter_map(|entry| entry.into_iter().next())
        .filter_map(|label| match label {
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .collect())
}
