// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 默认桌面端 User-Agent，所有出站抓取默认携带
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 单个字段的抽取规则
///
/// `selector` 为 CSS 选择器；`attr` 存在时取该属性值，否则取文本；
/// `strip_prefix` 用于剥离站点附带的字段前缀（如 "作者："）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub selector: String,
    #[serde(default)]
    pub attr: Option<String>,
    #[serde(default)]
    pub strip_prefix: Option<String>,
}

impl FieldRule {
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: None,
            strip_prefix: None,
        }
    }

    pub fn attr(selector: &str, attr: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: Some(attr.to_string()),
            strip_prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.strip_prefix = Some(prefix.to_string());
        self
    }
}

/// 书源选择器映射
///
/// 一个书源全部的抽取规则：搜索结果列表、章节列表、正文。
/// 抽取引擎完全由该映射驱动，不存在按站点名分支的隐藏逻辑。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorMap {
    /// 搜索结果列表项选择器
    pub list_item: String,
    pub title: FieldRule,
    pub link: FieldRule,
    #[serde(default)]
    pub author: Option<FieldRule>,
    #[serde(default)]
    pub cover: Option<FieldRule>,
    #[serde(default)]
    pub description: Option<FieldRule>,
    /// 章节列表项选择器（取文本为标题，属性为链接）
    pub chapter_item: FieldRule,
    /// 正文容器选择器
    pub content: String,
}

impl Default for SelectorMap {
    /// 常见小说站布局，作为注册新书源时的缺省规则
    fn default() -> Self {
        Self {
            list_item: ".book-list li".to_string(),
            title: FieldRule::text("h4 a"),
            link: FieldRule::attr("h4 a", "href"),
            author: Some(FieldRule::text(".author").with_prefix("作者：")),
            cover: Some(FieldRule::attr(".book-img img", "src")),
            description: Some(FieldRule::text(".intro")),
            chapter_item: FieldRule::attr(".chapter-list a", "href"),
            content: ".chapter-content".to_string(),
        }
    }
}

/// 书源定义
///
/// URL 全局唯一。`enabled`/`latency_ms`/`last_checked`
/// 仅由健康监控更新，其余字段在配置装载或注册时写入。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDefinition {
    pub name: String,
    /// 站点基础URL，也是唯一性判据
    pub url: String,
    /// 搜索路径模板，`{keyword}` 以URL编码后的关键词替换
    pub search_path: String,
    pub selectors: SelectorMap,
    /// 额外请求头，随每次导航注入页面会话
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// 导航完成后的固定等待（毫秒），用于客户端渲染的站点
    #[serde(default)]
    pub render_delay_ms: u64,
    pub enabled: bool,
    /// 最近一次探活耗时（毫秒）
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
}

impl SourceDefinition {
    pub fn new(name: &str, url: &str, search_path: &str, selectors: SelectorMap) -> Self {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());
        Self {
            name: name.to_string(),
            url: url.trim_end_matches('/').to_string(),
            search_path: search_path.to_string(),
            selectors,
            headers,
            render_delay_ms: 0,
            enabled: true,
            latency_ms: None,
            last_checked: None,
        }
    }

    /// 拼出关键词对应的搜索页URL
    pub fn search_url(&self, keyword: &str) -> String {
        let encoded = urlencoding::encode(keyword);
        format!(
            "{}{}",
            self.url,
            self.search_path.replace("{keyword}", &encoded)
        )
    }
}

/// 缺省书源集合
///
/// 万书网为首选书源，其余为常见的备选站点。
pub fn default_sources() -> Vec<SourceDefinition> {
    vec![
        SourceDefinition::new(
            "万书网",
            "https://www.10000txt.com",
            "/s?q={keyword}",
            SelectorMap::default(),
        ),
        SourceDefinition::new(
            "笔趣阁",
            "https://www.biquge.com",
            "/search?keyword={keyword}",
            SelectorMap {
                list_item: ".result-list .result-item".to_string(),
                title: FieldRule::text(".result-game-item-title a"),
                link: FieldRule::attr(".result-game-item-title a", "href"),
                author: Some(
                    FieldRule::text(".result-game-item-info-tag span").with_prefix("作者："),
                ),
                cover: Some(FieldRule::attr(".result-game-item-pic img", "src")),
                description: Some(FieldRule::text(".result-game-item-desc")),
                chapter_item: FieldRule::attr("#list dd a", "href"),
                content: "#content".to_string(),
            },
        ),
        SourceDefinition::new(
            "顶点小说",
            "https://www.23us.com",
            "/search.php?q={keyword}",
            SelectorMap {
                list_item: ".search-list li".to_string(),
                title: FieldRule::text(".s2 a"),
                link: FieldRule::attr(".s2 a", "href"),
                author: Some(FieldRule::text(".s4")),
                cover: None,
                description: None,
                chapter_item: FieldRule::attr(".chapter-list td a", "href"),
                content: "#contents".to_string(),
            },
        ),
    ]
}
