// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 区域目录条目
#[derive(Debug, Clone)]
pub struct RegionEntry {
    /// 区域标识
    pub id: i64,
    /// 展示名称
    pub display_name: String,
    /// 区域站点基础主机，如 `https://spb.cian.ru`
    pub base_host: String,
}

/// 区域目录
///
/// 由区域解析阶段一次性构建，之后只读，
/// 作为后续各阶段的主机列表来源（不使用全局可变状态）
#[derive(Debug, Default)]
pub struct RegionCatalog {
    entries: Vec<RegionEntry>,
}

impl RegionCatalog {
    pub fn new(entries: Vec<RegionEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RegionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 目录中的基础主机列表，用于播种按主机的站点地图发现
    pub fn base_hosts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.base_host.clone()).collect()
    }
}
