// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::record::Record;
use crate::utils::errors::StorageError;
use async_trait::async_trait;

/// 记录接收端特质
///
/// 爬虫阶段与存储实现之间的接缝：生产实现写入MongoDB，
/// 测试使用内存实现
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// 持久化一条终态记录
    ///
    /// # 参数
    ///
    /// * `record` - 已通过finalize校验的记录
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 写入成功
    /// * `Err(StorageError)` - 写入失败，调用方记录日志后继续处理其他条目
    async fn store(&self, record: Record) -> Result<(), StorageError>;
}
