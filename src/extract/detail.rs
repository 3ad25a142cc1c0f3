// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static DESCRIPTION_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    // Two distinct page regions are concatenated into one description
    vec![
        Selector::parse(r#"div[data-name="Description"]"#).unwrap(),
        Selector::parse(r#"div[data-name="SellerComment"]"#).unwrap(),
    ]
});
static SPEC_TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"table[data-name="SummaryTable"]"#).unwrap());
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());
static LD_JSON_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

// Identifier fields live in an embedded page-config script block; each is a
// required field and is pulled out of the raw payload by fixed-pattern search.
static APP_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""appId": "([^"]+)", "pageMother"#).unwrap());
static OFFER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""offerId": "?([0-9]+)"?"#).unwrap());
static INSTANCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""instance": "([^"]+)""#).unwrap());
static PAGE_TYPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""pageType": "([^"]+)""#).unwrap());
static PAGE_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""pageName": "([^"]+)""#).unwrap());

/// 页面标识字段
///
/// 面包屑解析接口所需的全部标识，缺一不可
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIdentity {
    pub app_id: String,
    pub offer_id: String,
    pub instance: String,
    pub page_type: String,
    pub page_name: String,
}

/// 详情页提取结果
#[derive(Debug, Clone)]
pub struct DetailPage {
    pub title: String,
    pub description: String,
    pub media_urls: Vec<String>,
    /// 规格表：首行为表头，其余行按原样保留（不做列对齐或补齐）
    pub specification: Vec<Vec<String>>,
    pub identity: PageIdentity,
}

/// 从详情页HTML提取结构化字段
///
/// # 参数
///
/// * `html` - 页面原始负载
///
/// # 返回值
///
/// * `Ok(DetailPage)` - 提取结果
/// * `Err(ExtractError)` - 必填字段缺失，该页面的处理链就此中止
pub fn extract_detail(html: &str) -> Result<DetailPage, ExtractError> {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|h1| h1.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ExtractError::FieldNotFound("title"))?;

    let description = extract_description(&document);
    let media_urls = extract_media_urls(&document);
    let specification = extract_specification(&document);
    let identity = extract_identity(html)?;

    Ok(DetailPage {
        title,
        description,
        media_urls,
        specification,
        identity,
    })
}

/// 提取页面标识字段
///
/// 固定模式在原始负载中逐一检索；任一模式未命中即返回
/// 对应字段的提取错误，而不是panic
pub fn extract_identity(payload: &str) -> Result<PageIdentity, ExtractError> {
    Ok(PageIdentity {
        app_id: capture(&APP_ID_RE, payload, "appId")?,
        offer_id: capture(&OFFER_ID_RE, payload, "offerId")?,
        instance: capture(&INSTANCE_RE, payload, "instance")?,
        page_type: capture(&PAGE_TYPE_RE, payload, "pageType")?,
        page_name: capture(&PAGE_NAME_RE, payload, "pageName")?,
    })
}

fn capture(re: &Regex, payload: &str, field: &'static str) -> Result<String, ExtractError> {
    re.captures(payload)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(ExtractError::FieldNotFound(field))
}

// Description: both regions concatenated; lines trimmed, empty lines
// dropped, each surviving line title-cased, joined with newlines.
fn extract_description(document: &Html) -> String {
    let mut lines = Vec::new();
    for selector in DESCRIPTION_SELECTORS.iter() {
        for region in document.select(selector) {
            for line in region.text().flat_map(|chunk| chunk.lines()) {
                let line = line.trim();
                if !line.is_empty() {
                    lines.push(title_case(line));
                }
            }
        }
    }
    lines.join("\n")
}

// Media list comes from the ld+json script block's `image` array.
fn extract_media_urls(document: &Html) -> Vec<String> {
    for script in document.select(&LD_JSON_SELECTOR) {
        let raw = script.text().collect::<String>();
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
            match value.get("image") {
                Some(serde_json::Value::Array(items)) => {
                    return items
                        .iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect();
                }
                Some(serde_json::Value::String(single)) => return vec![single.clone()],
                _ => {}
            }
        }
    }
    Vec::new()
}

// First row with data cells becomes the header; rows without cells are
// skipped and do not count against the header row index. Data rows are
// captured verbatim even when their cell count differs from the header.
fn extract_specification(document: &Html) -> Vec<Vec<String>> {
    let Some(table) = document.select(&SPEC_TABLE_SELECTOR).next() else {
        return Vec::new();
    };

    table
        .select(&ROW_SELECTOR)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&CELL_SELECTOR).map(cell_text).collect();
            if cells.is_empty() {
                None
            } else {
                Some(cells)
            }
        })
        .collect()
}

// Cell text nodes are concatenated with newline separators and trimmed.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// str.title() semantics: first alphabetic character of every word is
// uppercased, the rest lowercased; any non-alphabetic character starts
// a new word.
fn title_case(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut word_start = true;
    for c in line.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}
