// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MongoSettings;
use crate::domain::record::Record;
use crate::domain::sink::RecordSink;
use crate::utils::errors::StorageError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use dashmap::DashSet;
use mongodb::bson::Document;
use mongodb::{Client, Database};
use tracing::{debug, info};

/// MongoDB存储管道
///
/// 接收终态记录，按变体写入对应集合，每条记录一个文档。
/// 集合在首次写入时惰性创建。集合句柄在所有并发完成的链
/// 之间共享，写入为相互独立的单文档插入，除客户端自身的
/// 线程安全外不需要额外加锁
pub struct MongoPipeline {
    database: Database,
    created: DashSet<&'static str>,
}

impl MongoPipeline {
    /// 连接目标数据库
    ///
    /// # 参数
    ///
    /// * `settings` - MongoDB连接配置
    ///
    /// # 返回值
    ///
    /// * `Ok(MongoPipeline)` - 就绪的存储管道
    /// * `Err(StorageError)` - 连接失败
    pub async fn connect(settings: &MongoSettings) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(&settings.uri).await?;
        let database = client.database(&settings.database);
        info!(database = %settings.database, "mongodb pipeline ready");
        Ok(Self {
            database,
            created: DashSet::new(),
        })
    }

    // Collections are created lazily on the first write of each kind;
    // the DashSet guard keeps the check to one task per run. A failed
    // check releases the guard so the next write re-runs it.
    async fn ensure_collection(&self, name: &'static str) -> Result<(), StorageError> {
        if !self.created.insert(name) {
            return Ok(());
        }

        let result: Result<(), StorageError> = async {
            let existing = self.database.list_collection_names().await?;
            if !existing.iter().any(|c| c == name) {
                self.database.create_collection(name).await?;
                info!(collection = name, "created collection");
            }
            Ok(())
        }
        .await;

        if result.is_err() {
            self.created.remove(name);
        }
        result
    }

    #[cfg(test)]
    fn collection_marked(&self, name: &str) -> bool {
        self.created.contains(name)
    }
}

#[async_trait]
impl RecordSink for MongoPipeline {
    /// 持久化一条终态记录
    ///
    /// 记录带本地截图路径时，先读取文件并以base64文本形式
    /// 内嵌到记录中，再移除路径字段；截图文件本身不删除。
    /// 存储I/O错误原样传播给调用方
    async fn store(&self, mut record: Record) -> Result<(), StorageError> {
        if !record.is_finalized() {
            return Err(StorageError::NotFinalized);
        }

        embed_screenshot(&mut record).await?;

        let collection = record.kind().collection();
        self.ensure_collection(collection).await?;

        self.database
            .collection::<Document>(collection)
            .insert_one(record.to_document())
            .await?;
        debug!(collection, "record persisted");
        Ok(())
    }
}

/// 把本地截图文件内嵌为base64文本字段
///
/// `screenshot_path` 字段存在时读取该文件，在
/// `screenshot_base64` 下写入编码文本并移除路径字段；
/// 无截图字段的记录原样通过
pub async fn embed_screenshot(record: &mut Record) -> Result<(), StorageError> {
    let Some(path) = record.get_text("screenshot_path").map(String::from) else {
        return Ok(());
    };

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| StorageError::Screenshot {
            path: path.clone(),
            source,
        })?;

    record.set_text("screenshot_base64", BASE64.encode(bytes));
    record.remove("screenshot_path");
    Ok(())
}
