// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 提取错误类型
///
/// 单个页面的字段提取失败，仅中止该页面的处理链
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("required field `{0}` not found in page payload")]
    FieldNotFound(&'static str),

    #[error("malformed compressed payload: {0}")]
    Gzip(#[from] std::io::Error),

    #[error("malformed API response: {0}")]
    ApiShape(String),
}

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("screenshot file `{path}` could not be read: {source}")]
    Screenshot {
        path: String,
        source: std::io::Error,
    },

    #[error("record is not finalized, refusing to persist")]
    NotFinalized,
}

/// 种子文件错误类型
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("seed file `{path}` could not be read: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("seed file `{path}` is not a valid JSON array: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}
