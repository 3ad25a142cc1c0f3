// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use mongodb::bson::{Bson, Document};
use std::collections::BTreeMap;
use thiserror::Error;

/// 记录错误类型
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("record of kind `{kind}` is missing required field `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

/// 记录变体
///
/// 每个变体对应一个存储集合与一组必填字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Offer,
    Url,
    Region,
}

impl RecordKind {
    /// 变体对应的集合名
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Offer => "offers",
            RecordKind::Url => "urls",
            RecordKind::Region => "regions",
        }
    }

    /// 变体的必填字段集合
    ///
    /// 记录只有在全部必填字段就位后才能转为终态
    fn required_fields(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Offer => &[
                "url",
                "title",
                "description",
                "app_id",
                "offer_id",
                "instance",
                "page_type",
                "page_name",
                "breadcrumbs",
            ],
            RecordKind::Url => &["url"],
            RecordKind::Region => &["id", "baseHost"],
        }
    }
}

/// 字段值
///
/// 记录字段的类型化取值：文本、文本列表或表格
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Table(Vec<Vec<String>>),
}

impl From<&FieldValue> for Bson {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(s) => Bson::String(s.clone()),
            FieldValue::List(items) => {
                Bson::Array(items.iter().map(|s| Bson::String(s.clone())).collect())
            }
            FieldValue::Table(rows) => Bson::Array(
                rows.iter()
                    .map(|row| {
                        Bson::Array(row.iter().map(|c| Bson::String(c.clone())).collect())
                    })
                    .collect(),
            ),
        }
    }
}

/// 提取记录
///
/// 跨多个流水线阶段增量构建的开放字段映射。
/// 记录在全部必填增强步骤完成并通过 [`Record::finalize`]
/// 校验之前不允许持久化，部分构建的记录绝不会进入存储
#[derive(Debug, Clone)]
pub struct Record {
    kind: RecordKind,
    fields: BTreeMap<String, FieldValue>,
    finalized: bool,
}

impl Record {
    /// 创建指定变体的空记录，自动带抓取时间戳
    pub fn new(kind: RecordKind) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            "crawled_at".to_string(),
            FieldValue::Text(chrono::Utc::now().to_rfc3339()),
        );
        Self {
            kind,
            fields,
            finalized: false,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn set_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, FieldValue::Text(value.into()));
    }

    pub fn set_list(&mut self, name: impl Into<String>, value: Vec<String>) {
        self.set(name, FieldValue::List(value));
    }

    pub fn set_table(&mut self, name: impl Into<String>, value: Vec<Vec<String>>) {
        self.set(name, FieldValue::Table(value));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// 从JSON对象批量吸收字段
    ///
    /// 标量转为文本，纯字符串数组转为列表，其余结构以紧凑JSON文本保存。
    /// 用于区域详情这类字段开放的API响应
    pub fn absorb_json(&mut self, object: &serde_json::Map<String, serde_json::Value>) {
        use serde_json::Value;

        for (key, value) in object {
            let field = match value {
                Value::String(s) => FieldValue::Text(s.clone()),
                Value::Number(n) => FieldValue::Text(n.to_string()),
                Value::Bool(b) => FieldValue::Text(b.to_string()),
                Value::Null => continue,
                Value::Array(items) if items.iter().all(|v| v.is_string()) => FieldValue::List(
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect(),
                ),
                other => FieldValue::Text(other.to_string()),
            };
            self.fields.insert(key.clone(), field);
        }
    }

    /// 校验必填字段并将记录转为终态
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 记录已可持久化
    /// * `Err(RecordError)` - 缺失必填字段
    pub fn finalize(&mut self) -> Result<(), RecordError> {
        for field in self.kind.required_fields() {
            if !self.fields.contains_key(*field) {
                return Err(RecordError::MissingField {
                    kind: self.kind.collection(),
                    field,
                });
            }
        }
        self.finalized = true;
        Ok(())
    }

    /// 转换为BSON文档
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (name, value) in &self.fields {
            doc.insert(name.clone(), Bson::from(value));
        }
        doc
    }
}
