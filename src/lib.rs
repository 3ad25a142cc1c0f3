// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 爬取调度模块
///
/// 提供按域名限速与并发控制的抓取器
pub mod crawler;

/// 领域模块
///
/// 包含核心业务实体：抓取目标、记录、区域目录
pub mod domain;

/// 引擎模块
///
/// 实现HTTP与浏览器两种抓取引擎及失败分类
pub mod engines;

/// 提取模块
///
/// 站点地图、详情页与面包屑响应的解析逻辑
pub mod extract;

/// 爬虫模块
///
/// 各爬取阶段：区域解析、URL发现、分类遍历、详情抽取
pub mod spiders;

/// 存储模块
///
/// MongoDB文档存储管道
pub mod storage;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
