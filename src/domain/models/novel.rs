// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::errors::OrchestratorError;

/// 搜索查询
///
/// 关键词去除首尾空白后不能为空，可选限定单一书源。
/// 查询一旦发出即不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// 搜索关键词
    pub keyword: String,
    /// 可选的书源限定（书源名称）
    pub source: Option<String>,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>, source: Option<String>) -> Self {
        Self {
            keyword: keyword.into(),
            source: source.filter(|s| !s.trim().is_empty()),
        }
    }

    /// 校验并返回规范化后的关键词
    ///
    /// # 错误
    ///
    /// 关键词去除空白后为空时返回 `InvalidQuery`
    pub fn normalized_keyword(&self) -> Result<&str, OrchestratorError> {
        let keyword = self.keyword.trim();
        if keyword.is_empty() {
            return Err(OrchestratorError::InvalidQuery);
        }
        Ok(keyword)
    }
}

/// 小说搜索结果记录
///
/// 仅由抽取引擎产出。`title` 保证非空，`link` 与 `cover`
/// 均已相对于所属书源的基础URL解析为绝对地址。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovelRecord {
    pub title: String,
    pub author: String,
    /// 封面绝对地址，无封面时为空字符串
    pub cover: String,
    /// 简介（前端字段名沿用 `desc`）
    #[serde(rename = "desc")]
    pub description: String,
    /// 详情页绝对地址
    pub link: String,
    /// 产出该记录的书源名称
    pub source: String,
}

/// 章节引用
///
/// 顺序在父记录内有意义，端到端必须保持。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    pub title: String,
    /// 章节页绝对地址
    pub link: String,
}

/// 章节内容
///
/// 每个输入的 `ChapterRef` 恰好对应一个条目，永不丢弃；
/// 获取失败时 `body` 为内联失败占位文本。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterContent {
    pub chapter: ChapterRef,
    pub body: String,
    pub failed: bool,
}

impl ChapterContent {
    pub fn ok(chapter: ChapterRef, body: String) -> Self {
        Self {
            chapter,
            body,
            failed: false,
        }
    }

    /// 构造带内联占位文本的失败条目
    pub fn failure(chapter: ChapterRef, reason: &str) -> Self {
        Self {
            chapter,
            body: format!("[获取内容失败: {}]", reason),
            failed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_normalization() {
        let query = SearchQuery::new("  dragon  ", None);
        assert_eq!(query.normalized_keyword().unwrap(), "dragon");

        let empty = SearchQuery::new("   ", None);
        assert!(matches!(
            empty.normalized_keyword(),
            Err(OrchestratorError::InvalidQuery)
        ));
    }

    #[test]
    fn test_blank_source_filter_dropped() {
        let query = SearchQuery::new("dragon", Some("  ".to_string()));
        assert!(query.source.is_none());
    }

    #[test]
    fn test_failure_placeholder_format() {
        let content = ChapterContent::failure(
            ChapterRef {
                title: "第一章".to_string(),
                link: "https://example.com/1".to_string(),
            },
            "timeout",
        );
        assert!(content.failed);
        assert_eq!(content.body, "[获取内容失败: timeout]");
    }
}
