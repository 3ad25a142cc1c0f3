// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::SeedError;
use serde::Deserialize;

/// 报价URL种子条目
///
/// `urls.json` 为 `[{"url": "..."}]` 形式的JSON数组
#[derive(Debug, Deserialize)]
pub struct UrlSeed {
    pub url: String,
}

/// 区域种子条目
///
/// `regions.json` 为 `[{"baseHost": "..."}]` 形式的JSON数组，
/// 其余区域字段在发现阶段不使用，反序列化时忽略
#[derive(Debug, Deserialize)]
pub struct RegionSeed {
    #[serde(rename = "baseHost")]
    pub base_host: String,
}

fn load<T: serde::de::DeserializeOwned>(path: &str) -> Result<Vec<T>, SeedError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_string(),
        source,
    })
}

/// 读取报价URL种子列表
pub fn load_seed_urls(path: &str) -> Result<Vec<String>, SeedError> {
    Ok(load::<UrlSeed>(path)?.into_iter().map(|s| s.url).collect())
}

/// 读取区域基础主机列表
pub fn load_seed_hosts(path: &str) -> Result<Vec<String>, SeedError> {
    Ok(load::<RegionSeed>(path)?
        .into_iter()
        .map(|s| s.base_host)
        .collect())
}
